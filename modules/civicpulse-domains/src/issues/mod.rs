pub mod model;
pub mod mutate;
pub mod submit;
pub mod validate;

pub use model::{InsertIssue, Issue};
pub use mutate::{change_status, delete_issue, edit_issue, Caller};
pub use submit::{submit_issue, SubmittedIssue};
pub use validate::{EditIssuePayload, NewIssuePayload};
