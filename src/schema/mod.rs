pub mod arc;
pub mod character;
pub mod effect;
pub mod event;
pub mod npc;
pub mod role;
