// ABOUTME: HTTP plumbing for talking to the image server.
// ABOUTME: Endpoint parsing, a one-shot hyper request helper, and the listing client.

mod endpoint;
mod http;
mod listing;

pub use endpoint::{Endpoint, EndpointError};
pub use http::HttpError;
pub(crate) use http::send;
pub use listing::{HttpListingClient, ListingError, NoListing, RemoteListing};
