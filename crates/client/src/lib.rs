//! Client side of shellcache.
//!
//! This crate provides the network seam and the gateway that sits between
//! pages and the network: install/activate lifecycle, fetch routing, push
//! notifications and background sync.

pub mod fetch;
pub mod gateway;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network};
pub use gateway::{
    ActivateOutcome, ControlMessage, Destination, EventOutcome, FetchOutcome, Gateway, GatewayRequest, GatewayResponse,
    GatewayStatus, Host, InstallOutcome, Notification, NotificationClick, OfflineQueue, PushPayload, RecordingHost,
    RequestMode, ResponseSource, Route, SyncTag, WorkerEvent, WorkerState,
};
