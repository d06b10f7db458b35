//! quizgrade-report — HTML rendering for the interview page flow.
//!
//! Pages are self-contained documents with inlined CSS; every piece of
//! candidate or dataset text is escaped before insertion.

pub mod html;

pub use html::{error_page, intro_page, question_page, summary_page};
