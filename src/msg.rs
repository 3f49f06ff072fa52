use serde::{Deserialize, Serialize};

use crate::store::Collection;

#[derive(Clone, Debug)]
/// A message which is broadcast after a document in one of the collections
/// has been written. Subscribers use it to decide whether to reload their
/// snapshot of `collection`.
pub struct Msg {
    pub collection: Collection,
    pub inner: MsgContents,
}

/// The id of the document that changed.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MsgContents {
    Added(String),
    Modified(String),
    Removed(String),
}
