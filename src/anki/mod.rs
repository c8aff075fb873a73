pub mod api;
pub mod collection;
pub mod connect;
pub mod note;

pub use collection::{
    CollectionNote,
    JsonCollection,
};
pub use connect::{
    AnkiConnectNote,
    AnkiConnectStore,
};
pub use note::{
    Note,
    NoteData,
    NoteId,
    NoteStore,
};
