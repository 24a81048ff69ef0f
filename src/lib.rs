//! Mirror a local directory tree onto a remote host over SFTP.
//!
//! The tree is walked depth first and every entry is recreated below the
//! remote root: directories with a recursive create, files by streaming
//! their contents. The run stops at the first error and leaves what it
//! already created in place.
//!
//! ```no_run
//! use sftp_mirror::{client, UploadOptions, Uploader};
//!
//! # async fn run() -> sftp_mirror::Result<()> {
//! let options = client::ConnectOptions {
//!     user: "deploy".to_owned(),
//!     password: "secret".to_owned(),
//!     server: "example.com:22".to_owned(),
//!     timeout: None,
//! };
//! let connection = client::connect(&options).await?;
//! let summary = Uploader::new(connection.sftp(), UploadOptions::default())
//!     .upload("./site", "/var/www/site")
//!     .await?;
//! println!("{} files uploaded", summary.files);
//! connection.close().await
//! # }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

pub mod client;
mod error;
pub mod event;
pub mod path;
pub mod remote;
pub mod upload;
pub mod walk;

pub use error::{BoxError, Error, Result, UploadStep};
pub use upload::{upload, UploadOptions, UploadSummary, Uploader};
