pub mod answer;
pub mod attempt;
pub mod question;
pub mod session_report;
pub mod user;
