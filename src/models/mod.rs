pub mod task;
pub mod user;
pub mod validation;

pub use task::{display_color, Task, TaskCreateRequest, TaskQuery, TaskStatus, TaskUpdateRequest, TaskView};
pub use user::{NewUser, User, UserSummary};
pub use validation::{validate_and_normalize, TaskDraft, TaskValidationError, ValidTask, ValidationMode};
