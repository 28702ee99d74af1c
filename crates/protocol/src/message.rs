//! Message identifiers and the type-erased pipeline message

use std::any::Any;

/// Control message identifiers
///
/// These six ids are reserved; data-message ids are assigned per
/// configured reader and must not collide with them (enforced by
/// configuration validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageId {
    /// Config file name, relative to the server's config directory
    Filename = 1,
    /// Inline configuration text
    Config = 2,
    /// Serialized acquisition header
    Header = 3,
    /// Terminate input processing
    Close = 4,
    /// Server-to-client text (query replies travel as TEXT)
    Text = 5,
    /// Client request for server information
    Query = 6,
}

impl MessageId {
    /// Largest reserved control id
    pub const RESERVED_MAX: u16 = 6;

    /// True if `id` falls in the reserved control range
    #[inline]
    pub fn is_reserved(id: u16) -> bool {
        (1..=Self::RESERVED_MAX).contains(&id)
    }

    /// Decode a wire id into a control message id, if it is one
    pub fn from_wire(id: u16) -> Option<Self> {
        match id {
            1 => Some(Self::Filename),
            2 => Some(Self::Config),
            3 => Some(Self::Header),
            4 => Some(Self::Close),
            5 => Some(Self::Text),
            6 => Some(Self::Query),
            _ => None,
        }
    }
}

impl From<MessageId> for u16 {
    fn from(id: MessageId) -> u16 {
        id as u16
    }
}

/// A decoded data message flowing through the pipeline
///
/// The payload is type-erased: readers produce their own payload types
/// and downstream stages downcast to the types they understand. The
/// wire id the message arrived with travels along for writer lookup on
/// the way back out.
pub struct Message {
    id: u16,
    payload: Box<dyn Any + Send>,
}

impl Message {
    /// Wrap a payload decoded from a message with the given wire id
    pub fn new<T: Any + Send>(id: u16, payload: T) -> Self {
        Self {
            id,
            payload: Box::new(payload),
        }
    }

    /// Wrap an already-boxed payload (readers return type-erased payloads)
    pub fn from_boxed(id: u16, payload: Box<dyn Any + Send>) -> Self {
        Self { id, payload }
    }

    /// The wire id this message arrived with (or will be written with)
    #[inline]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Borrow the payload as `T`, if that is what it holds
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    /// Take the payload as `T`, returning the message unchanged on mismatch
    pub fn downcast<T: Any>(self) -> std::result::Result<Box<T>, Self> {
        let Self { id, payload } = self;
        payload.downcast().map_err(|payload| Self { id, payload })
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message").field("id", &self.id).finish()
    }
}
