pub mod attempt_service;
pub mod grading_service;
pub mod session_service;
pub mod test_service;
