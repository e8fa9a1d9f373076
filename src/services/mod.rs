pub mod accounts;
pub mod tasks;

pub use accounts::AccountService;
pub use tasks::TaskService;
