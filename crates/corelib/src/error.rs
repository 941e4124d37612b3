//! Core shared errors (renderer-agnostic).

use thiserror::Error;

use crate::scene::GameObjectId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Game object {0:?} does not exist or was despawned")]
    DeadObject(GameObjectId),
    #[error("Game object {id:?} already has a {component}")]
    DuplicateComponent {
        id: GameObjectId,
        component: &'static str,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
