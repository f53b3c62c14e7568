pub mod action;
pub mod decay;
pub mod policy;
pub mod q_table;
pub mod reward;
