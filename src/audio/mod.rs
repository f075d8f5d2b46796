pub mod artifact;
pub mod backend;
pub mod file;

pub use artifact::{suggested_name, Artifact};
pub use backend::{
    ArtifactFormat, AudioInput, AudioInputConfig, AudioInputFactory, AudioSource, DeviceEvent,
    UnsupportedInput,
};
pub use file::WavFileInput;
