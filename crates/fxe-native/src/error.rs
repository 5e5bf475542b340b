//! Native graph errors.

use thiserror::Error;

use crate::block::BlockType;
use crate::id::BlockId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    #[error("block {block} is a {expected}, got {found} data")]
    TypeMismatch {
        block: BlockId,
        expected: BlockType,
        found: BlockType,
    },
}
