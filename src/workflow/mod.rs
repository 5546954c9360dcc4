pub mod quiz_generator;
pub mod quiz_session;

pub use quiz_generator::QuizGenerator;
pub use quiz_session::{GenerationTicket, Phase, QuizSession, SessionSnapshot, Transition};
