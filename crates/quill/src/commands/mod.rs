//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod new;
pub(crate) mod render;
pub(crate) mod settings;

pub(crate) use check::CheckArgs;
pub(crate) use decode::DecodeArgs;
pub(crate) use encode::EncodeArgs;
pub(crate) use new::NewArgs;
pub(crate) use render::RenderArgs;
pub(crate) use settings::SettingsArgs;
