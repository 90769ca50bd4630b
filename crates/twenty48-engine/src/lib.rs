pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum MoveError {
    #[display("game is over")]
    GameOver,
    #[display("previous move has not settled yet")]
    Busy,
    #[display("move does not change the grid")]
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum UndoError {
    #[display("game is over")]
    GameOver,
    #[display("previous move has not settled yet")]
    Busy,
    #[display("nothing to undo")]
    EmptyHistory,
}
