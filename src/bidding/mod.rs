pub mod clock;
pub mod commands;
pub mod error;
pub mod increment;
pub mod model;
pub mod soft_close;
pub mod validator;
