pub mod model;

pub use model::{
    AuthSession, Contact, Flat, FlatPatch, FlatWithOwner, Message, MessageWithSender, NewFlat,
    NewUser, Role, User, UserPatch, UserSummary,
};
