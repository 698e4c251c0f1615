//! latex-image: preference negotiation and remote LaTeX rendering into
//! inline markdown images.

pub mod elicitation;
pub mod negotiation;
pub mod preferences;
pub mod render;
pub mod resolver;
pub mod store;
pub mod types;

pub use elicitation::{
    ElicitationAction, ElicitationRequest, ElicitationResponse, Elicitor, NoElicitation,
};
pub use negotiation::{Candidates, Negotiated, NegotiationStrategy};
pub use preferences::{load_preferences, PreferenceOverrides};
pub use render::{RenderPipeline, RenderRequest, RenderedImage, DEFAULT_ENDPOINT, DEFAULT_MAX_IMAGE_BYTES};
pub use resolver::{Latch, PreferenceResolver};
pub use store::{ConfigStore, JsonConfigStore, MemoryConfigStore};
pub use types::*;
