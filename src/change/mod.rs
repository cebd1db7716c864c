mod file;
mod status;

#[allow(unused_imports)]
pub use file::{
    resolve_file_change, resolve_file_changes, FileChange, InMemoryChange, RawFileChange,
    SlimChange,
};
#[allow(unused_imports)]
pub use status::{classify, classify_label, ChangeStatus, ProviderStatus};
