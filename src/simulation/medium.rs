//! The shared medium: interface registry and transmission dispatcher.
//!
//! A `Medium` holds every registered communication interface and at most one
//! Motion strategy. A transmit call fans out to every *other* registered
//! interface: the Motion strategy provides a propagation delay and an
//! in-transit carrier transformation per destination, and one delivery event
//! per destination is scheduled on the event queue. At delivery time the
//! destination's Specificity strategy decides whether the payload reaches the
//! upper layer or the carrier is silently dropped.
//!
//! The registry is append-only (static topology): interfaces are registered
//! during setup and only read during dispatch. Interfaces are addressed by
//! `InterfaceId` handles resolved through the medium, not by shared
//! references.

use crate::molecular::geometry::Point3;
use crate::simulation::carrier::MessageCarrier;
use crate::simulation::field::Field;
use crate::simulation::motion::Motion;
use crate::simulation::perturbation::{CarrierError, Perturbation};
use crate::simulation::scheduler::EventQueue;
use crate::simulation::specificity::Specificity;

/// Handle of a registered interface: its index in the medium's registry.
pub type InterfaceId = usize;

/// Transmitter half of a communication interface.
pub struct TransmitterInterface {
    perturbation: Box<dyn Perturbation>,
}

/// Receiver half of a communication interface.
pub struct ReceiverInterface {
    specificity: Box<dyn Specificity>,
}

/// One communicating endpoint: the device it belongs to, its position in the
/// medium, and exactly one transmitter and one receiver half.
pub struct CommunicationInterface {
    device_id: u32,
    position: Point3,
    tx: TransmitterInterface,
    rx: ReceiverInterface,
}

impl CommunicationInterface {
    pub fn new(device_id: u32, position: Point3, perturbation: Box<dyn Perturbation>, specificity: Box<dyn Specificity>) -> Self {
        CommunicationInterface {
            device_id,
            position,
            tx: TransmitterInterface { perturbation },
            rx: ReceiverInterface { specificity },
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn position(&self) -> Point3 {
        self.position
    }
}

/// The shared medium and its dispatcher.
pub struct Medium {
    interfaces: Vec<CommunicationInterface>,
    motion: Option<Box<dyn Motion>>,
}

impl Medium {
    pub fn new() -> Self {
        Medium {
            interfaces: Vec::new(),
            motion: None,
        }
    }

    /// Configure the single Motion strategy. Without one, dispatch uses the
    /// documented no-op policy: zero delay, carrier unchanged.
    pub fn set_motion(&mut self, motion: Box<dyn Motion>) {
        self.motion = Some(motion);
    }

    /// Append an interface to the registry and return its handle. No
    /// de-duplication, no removal: topology is fixed once the run starts.
    pub fn register_interface(&mut self, interface: CommunicationInterface) -> InterfaceId {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface(&self, id: InterfaceId) -> &CommunicationInterface {
        &self.interfaces[id]
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    /// Upstream entry point: build a carrier for `payload` via the source's
    /// perturbation strategy, then dispatch it. `Ok(())` means "accepted for
    /// transmission"; delivery outcomes are only observable downstream.
    pub fn transmit_payload(&mut self, src: InterfaceId, payload: &[u8], field: &Field, queue: &mut EventQueue) -> Result<(), CarrierError> {
        let carrier = self.interfaces[src].tx.perturbation.create_carrier(payload, queue.now())?;
        self.transmit(src, carrier, field, queue);
        Ok(())
    }

    /// Dispatch a built carrier: schedule one delivery per registered
    /// interface other than the source.
    pub fn transmit(&mut self, src: InterfaceId, carrier: MessageCarrier, field: &Field, queue: &mut EventQueue) {
        log::debug!(
            "dispatch from interface {} (device {}) to {} other interface(s)",
            src,
            self.interfaces[src].device_id(),
            self.interfaces.len().saturating_sub(1)
        );

        for dst in 0..self.interfaces.len() {
            // An interface never receives its own transmission
            if dst == src {
                continue;
            }

            let (delay, delivered) = match self.motion.as_mut() {
                Some(motion) => {
                    let mut delivered = carrier.clone();
                    let delay = motion.compute_delay(&self.interfaces[src], &self.interfaces[dst], &carrier, field);
                    motion.transform(&self.interfaces[src], &self.interfaces[dst], &mut delivered, field);
                    (delay, delivered)
                }
                None => {
                    log::debug!("no motion strategy configured; delivering unchanged at zero delay");
                    (0.0, carrier.clone())
                }
            };

            queue.schedule(delay, src, dst, delivered);
        }
    }

    /// Deliver a carrier that reached `dst`: run the receiver's specificity
    /// check and return the unwrapped payload on acceptance. A `None` is a
    /// silent drop; the upper layer sees nothing.
    pub fn deliver(&self, src: InterfaceId, dst: InterfaceId, carrier: MessageCarrier) -> Option<Vec<u8>> {
        let accepted = self.interfaces[dst].rx.specificity.check_compatibility(&self.interfaces[src], &self.interfaces[dst], &carrier);
        if accepted {
            Some(carrier.into_payload())
        } else {
            log::debug!("carrier from interface {} dropped at interface {}", src, dst);
            None
        }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Medium::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::perturbation::DefaultPerturbation;
    use crate::simulation::specificity::DefaultSpecificity;

    fn default_interface(device_id: u32) -> CommunicationInterface {
        CommunicationInterface::new(
            device_id,
            Point3::new(device_id as f64, 0.0, 0.0),
            Box::new(DefaultPerturbation),
            Box::new(DefaultSpecificity),
        )
    }

    #[test]
    fn dispatch_fans_out_to_every_other_interface() {
        let mut medium = Medium::new();
        let a = medium.register_interface(default_interface(1));
        medium.register_interface(default_interface(2));
        medium.register_interface(default_interface(3));
        medium.register_interface(default_interface(4));

        let mut queue = EventQueue::new();
        medium.transmit_payload(a, &[42], &Field::Generic, &mut queue).unwrap();

        // One scheduled delivery per other registered interface
        assert_eq!(queue.len(), medium.interface_count() - 1);
        while let Some(delivery) = queue.pop() {
            assert_ne!(delivery.dst, a, "source received its own transmission");
        }
    }

    #[test]
    fn no_motion_delivers_unchanged_at_zero_delay() {
        let mut medium = Medium::new();
        let a = medium.register_interface(default_interface(1));
        let b = medium.register_interface(default_interface(2));

        let mut queue = EventQueue::new();
        medium.transmit_payload(a, &[7], &Field::Generic, &mut queue).unwrap();

        assert_eq!(queue.len(), 1);
        let delivery = queue.pop().unwrap();
        assert_eq!(delivery.dst, b);
        assert!((delivery.time - 0.0).abs() < 1e-12);
        assert_eq!(delivery.carrier.payload(), &[7]);

        // Default specificity accepts unconditionally
        let payload = medium.deliver(delivery.src, delivery.dst, delivery.carrier);
        assert_eq!(payload, Some(vec![7]));
    }
}
