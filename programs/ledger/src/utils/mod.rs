pub mod math;
pub mod scan;
pub mod vesting;
pub mod window;
