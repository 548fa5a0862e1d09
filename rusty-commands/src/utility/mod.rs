pub mod choose;
pub mod help;
pub mod pagetest;
pub mod waitfor;
