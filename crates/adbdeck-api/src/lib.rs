// adbdeck-api: async runner and output parsers for adb and fastboot

pub mod adb;
pub mod error;
pub mod executor;
pub mod parse;
pub mod types;
pub mod validate;

pub use adb::AdbClient;
pub use error::Error;
pub use executor::{Executor, ExecutorConfig, Tool};
pub use types::{
    DeviceEntry, DeviceInfo, ItemOutcome, PackageEntry, PackageScope, RawFileEntry, RawFileKind,
    RebootMode,
};
