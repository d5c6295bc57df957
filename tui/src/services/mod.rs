pub mod alert;
pub mod comment_dialog;
pub mod feed;
pub mod handlers;
pub mod scroll_lock;
