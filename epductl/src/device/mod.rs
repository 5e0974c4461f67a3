//! Device model: a validated PDU and its outlets.
//!
//! A [`Pdu`] only exists once its identity has been discovered and
//! validated, so outlet operations can never reach an unverified device.

mod builder;
mod identity;
mod outlet;
mod registry;

pub use builder::PduBuilder;
pub use identity::{
    DeviceIdentity, discover_identity, is_firmware_version_ok, is_part_number_ok,
    is_serial_number_ok,
};
pub use outlet::{OutletAction, OutletOutcome};
pub use registry::{BUILTIN_PART_NUMBERS, ModelRegistry};

use log::{debug, info, warn};

use crate::channel::ShellChannel;
use crate::error::Result;
use crate::protocol::ObjectStore;
use crate::session::{ShellSession, SshSession};

/// A PDU with validated identity.
pub struct Pdu<S: ObjectStore = SshSession> {
    /// Object access to the device.
    store: S,

    /// Identity discovered at connect time.
    identity: DeviceIdentity,
}

impl<S: ObjectStore> Pdu<S> {
    /// Discover and validate the identity of the device behind `store`.
    pub async fn discover(mut store: S, models: &ModelRegistry) -> Result<Self> {
        let identity = discover_identity(&mut store, models).await?;
        Ok(Self { store, identity })
    }

    /// The validated identity.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Number of outlets on the device.
    pub fn outlet_count(&self) -> u32 {
        self.identity.outlet_count
    }

    /// Check if `outlet` is a valid 1-based outlet index.
    pub fn has_outlet(&self, outlet: u32) -> bool {
        (1..=self.outlet_count()).contains(&outlet)
    }

    /// Switch an outlet on.
    ///
    /// The index is not checked against the outlet count; use
    /// [`apply`](Self::apply) for range-checked batches.
    pub async fn power_on(&mut self, outlet: u32) -> Result<()> {
        self.switch(OutletAction::On, outlet).await
    }

    /// Switch an outlet off.
    ///
    /// The index is not checked against the outlet count.
    pub async fn power_off(&mut self, outlet: u32) -> Result<()> {
        self.switch(OutletAction::Off, outlet).await
    }

    /// Apply an action to several outlets, in order.
    ///
    /// Indices outside `1..=outlet_count` are skipped and reported as
    /// [`OutletOutcome::NoSuchOutlet`]; the rest of the batch continues.
    pub async fn apply(
        &mut self,
        action: OutletAction,
        outlets: &[u32],
    ) -> Result<Vec<OutletOutcome>> {
        let mut outcomes = Vec::with_capacity(outlets.len());
        for &outlet in outlets {
            if !self.has_outlet(outlet) {
                debug!(
                    "skipping outlet {} ({} outlets on device)",
                    outlet,
                    self.outlet_count()
                );
                outcomes.push(OutletOutcome::NoSuchOutlet(outlet));
                continue;
            }
            self.switch(action, outlet).await?;
            outcomes.push(OutletOutcome::Applied(outlet));
        }
        Ok(outcomes)
    }

    /// Get a mutable reference to the object store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    async fn switch(&mut self, action: OutletAction, outlet: u32) -> Result<()> {
        info!("outlet {}: {}", outlet, action);
        let reply = self.store.set(&action.delay_path(outlet), "0").await?;
        if !reply.is_empty() {
            debug!("outlet {} {} reply: {:?}", outlet, action, reply);
        }
        Ok(())
    }
}

impl<C: ShellChannel> Pdu<ShellSession<C>> {
    /// Discover identity on a started session.
    ///
    /// If discovery fails the session is logged out before the error is
    /// returned.
    pub async fn start(mut session: ShellSession<C>, models: &ModelRegistry) -> Result<Self> {
        match discover_identity(&mut session, models).await {
            Ok(identity) => Ok(Self {
                store: session,
                identity,
            }),
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    warn!("logout after failed discovery: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Log out and release the connection. Safe to call twice.
    pub async fn close(&mut self) -> Result<()> {
        self.store.close().await
    }
}
