//! In-memory relayer joining two chain endpoints with one ordered channel
//! per direction.
//!
//! [`OrderedLink`] stands in for the packet-relay transport the system
//! treats as a black box: it delivers each packet at most once to the
//! receiving chain's handler, later delivers at most one acknowledgement
//! back to the sender, or runs the sender's timeout callback if the packet's
//! threshold elapses first. Exactly one of {acknowledgement, timeout} is
//! dispatched per packet.
//!
//! Each endpoint carries its own consensus clock. The clocks only move when
//! a driver advances them, which is what makes timeout behavior
//! deterministic in tests and the CLI demo.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use tracing::{debug, warn};

use crosslink_protocol::AckEnvelope;

use crate::error::ChannelResult;
use crate::handler::PacketHandler;
use crate::types::{ChannelId, Packet, PacketState, PortId, Timeout};

/// Which endpoint of the link a call refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Port and channel bound by one endpoint.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    pub port: PortId,
    pub channel: ChannelId,
}

/// One relay step's observable outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    /// A packet reached the destination handler and its ack was queued.
    Delivered { to: Side, sequence: u64 },
    /// An acknowledgement reached the original sender's handler.
    AckDelivered { to: Side, sequence: u64 },
    /// A packet passed its timeout threshold; the sender's timeout callback
    /// ran.
    TimedOut { side: Side, sequence: u64 },
}

struct Endpoint {
    port: PortId,
    channel: ChannelId,
    next_sequence: u64,
    now_ns: u64,
    /// Lifecycle of every packet this endpoint has sent, by sequence.
    states: BTreeMap<u64, PacketState>,
}

impl Endpoint {
    fn new(config: EndpointConfig) -> Self {
        Self {
            port: config.port,
            channel: config.channel,
            next_sequence: 1,
            now_ns: 0,
            states: BTreeMap::new(),
        }
    }
}

/// Packets and acks traveling in one direction.
#[derive(Default)]
struct Direction {
    in_flight: VecDeque<Packet>,
    pending_acks: VecDeque<(Packet, AckEnvelope)>,
}

struct LinkState {
    a: Endpoint,
    b: Endpoint,
    /// Packets A→B and their acks traveling back to A.
    from_a: Direction,
    /// Packets B→A and their acks traveling back to B.
    from_b: Direction,
}

impl LinkState {
    fn endpoint(&mut self, side: Side) -> &mut Endpoint {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    fn direction(&mut self, from: Side) -> &mut Direction {
        match from {
            Side::A => &mut self.from_a,
            Side::B => &mut self.from_b,
        }
    }
}

/// The shared in-memory link between the two chains.
///
/// Keepers hold it behind an `Arc` and call [`OrderedLink::send`]; a driver
/// (tests, the CLI demo) pumps deliveries with [`OrderedLink::step`] or
/// [`OrderedLink::run_until_idle`].
pub struct OrderedLink {
    state: Mutex<LinkState>,
}

impl OrderedLink {
    pub fn new(a: EndpointConfig, b: EndpointConfig) -> Self {
        Self {
            state: Mutex::new(LinkState {
                a: Endpoint::new(a),
                b: Endpoint::new(b),
                from_a: Direction::default(),
                from_b: Direction::default(),
            }),
        }
    }

    /// Queue a packet from `from` toward the other endpoint. Returns the
    /// assigned sequence number.
    pub fn send(&self, from: Side, data: Vec<u8>, timeout: Timeout) -> ChannelResult<u64> {
        let mut state = self.state.lock().expect("lock poisoned");
        let (src_port, src_channel) = {
            let ep = state.endpoint(from);
            (ep.port.clone(), ep.channel.clone())
        };
        let (dest_port, dest_channel) = {
            let ep = state.endpoint(from.other());
            (ep.port.clone(), ep.channel.clone())
        };
        let ep = state.endpoint(from);
        let sequence = ep.next_sequence;
        ep.next_sequence += 1;
        ep.states.insert(sequence, PacketState::Sent);

        let packet = Packet {
            sequence,
            source_port: src_port,
            source_channel: src_channel,
            dest_port,
            dest_channel,
            data,
            timeout,
        };
        debug!(side = %from, sequence, "packet queued");
        state.direction(from).in_flight.push_back(packet);
        Ok(sequence)
    }

    /// The current consensus timestamp of `side`, as a counterparty's
    /// light client would report it. Senders use the *destination* side's
    /// value to resolve relative timeouts into absolute ones.
    pub fn consensus_timestamp(&self, side: Side) -> u64 {
        let mut state = self.state.lock().expect("lock poisoned");
        state.endpoint(side).now_ns
    }

    /// Advance `side`'s consensus clock.
    pub fn advance_time(&self, side: Side, delta_ns: u64) {
        let mut state = self.state.lock().expect("lock poisoned");
        let ep = state.endpoint(side);
        ep.now_ns += delta_ns;
    }

    /// Lifecycle state of a packet sent by `side`, if known.
    pub fn packet_state(&self, side: Side, sequence: u64) -> Option<PacketState> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.endpoint(side).states.get(&sequence).copied()
    }

    /// Number of packets still in flight from `side`.
    pub fn in_flight(&self, side: Side) -> usize {
        let mut state = self.state.lock().expect("lock poisoned");
        state.direction(side).in_flight.len()
    }

    /// Perform one relay step: deliver the oldest pending acknowledgement,
    /// or failing that the oldest in-flight packet. Returns `None` when the
    /// link is idle.
    ///
    /// Acknowledgements are delivered in the order their packets were sent
    /// on the channel; packets likewise. The packet leaves its queue before
    /// any handler runs, so redelivery is impossible even if a handler
    /// fails.
    pub fn step(
        &self,
        handler_a: &dyn PacketHandler,
        handler_b: &dyn PacketHandler,
    ) -> ChannelResult<Option<RelayEvent>> {
        // Acks first, oldest first, so a packet's verdict always lands
        // before anything that was sent after it was acknowledged.
        for side in [Side::A, Side::B] {
            let popped = {
                let mut state = self.state.lock().expect("lock poisoned");
                state.direction(side).pending_acks.pop_front()
            };
            if let Some((packet, ack)) = popped {
                let handler = match side {
                    Side::A => handler_a,
                    Side::B => handler_b,
                };
                let success = matches!(ack, AckEnvelope::Result(_));
                let result = handler.on_acknowledgement(&packet, &ack);
                {
                    let mut state = self.state.lock().expect("lock poisoned");
                    state
                        .endpoint(side)
                        .states
                        .insert(packet.sequence, PacketState::Acked { success });
                }
                result?;
                debug!(side = %side, sequence = packet.sequence, success, "ack delivered");
                return Ok(Some(RelayEvent::AckDelivered {
                    to: side,
                    sequence: packet.sequence,
                }));
            }
        }

        for side in [Side::A, Side::B] {
            let popped = {
                let mut state = self.state.lock().expect("lock poisoned");
                let dest_now = state.endpoint(side.other()).now_ns;
                state
                    .direction(side)
                    .in_flight
                    .pop_front()
                    .map(|p| (p, dest_now))
            };
            if let Some((packet, dest_now)) = popped {
                if packet.timeout.has_elapsed(dest_now) {
                    // Undeliverable: the sender gets its timeout callback,
                    // and never an acknowledgement for this packet.
                    {
                        let mut state = self.state.lock().expect("lock poisoned");
                        state
                            .endpoint(side)
                            .states
                            .insert(packet.sequence, PacketState::TimedOut);
                    }
                    warn!(side = %side, sequence = packet.sequence, "packet timed out");
                    let handler = match side {
                        Side::A => handler_a,
                        Side::B => handler_b,
                    };
                    handler.on_timeout(&packet)?;
                    return Ok(Some(RelayEvent::TimedOut {
                        side,
                        sequence: packet.sequence,
                    }));
                }

                let receiver = match side.other() {
                    Side::A => handler_a,
                    Side::B => handler_b,
                };
                let ack = receiver.on_recv(&packet);
                let sequence = packet.sequence;
                {
                    let mut state = self.state.lock().expect("lock poisoned");
                    state
                        .endpoint(side)
                        .states
                        .insert(sequence, PacketState::Received);
                    state.direction(side).pending_acks.push_back((packet, ack));
                }
                debug!(from = %side, sequence, "packet delivered");
                return Ok(Some(RelayEvent::Delivered {
                    to: side.other(),
                    sequence,
                }));
            }
        }

        Ok(None)
    }

    /// Pump the link until no packets or acks remain in flight.
    pub fn run_until_idle(
        &self,
        handler_a: &dyn PacketHandler,
        handler_b: &dyn PacketHandler,
    ) -> ChannelResult<Vec<RelayEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.step(handler_a, handler_b)? {
            events.push(event);
        }
        Ok(events)
    }
}

impl std::fmt::Debug for OrderedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("lock poisoned");
        f.debug_struct("OrderedLink")
            .field("a_in_flight", &state.from_a.in_flight.len())
            .field("b_in_flight", &state.from_b.in_flight.len())
            .field("a_pending_acks", &state.from_a.pending_acks.len())
            .field("b_pending_acks", &state.from_b.pending_acks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn endpoint(port: &str, channel: &str) -> EndpointConfig {
        EndpointConfig {
            port: PortId::new(port).unwrap(),
            channel: ChannelId::new(channel).unwrap(),
        }
    }

    fn link() -> OrderedLink {
        OrderedLink::new(
            endpoint("metastore", "channel-0"),
            endpoint("datastore", "channel-0"),
        )
    }

    /// Handler that records every callback it receives.
    #[derive(Default)]
    struct RecordingHandler {
        recvs: Mutex<Vec<u64>>,
        acks: Mutex<Vec<(u64, bool)>>,
        timeouts: Mutex<Vec<u64>>,
    }

    impl PacketHandler for RecordingHandler {
        fn on_recv(&self, packet: &Packet) -> AckEnvelope {
            self.recvs.lock().unwrap().push(packet.sequence);
            AckEnvelope::success().unwrap()
        }

        fn on_acknowledgement(&self, packet: &Packet, ack: &AckEnvelope) -> ChannelResult<()> {
            let success = matches!(ack, AckEnvelope::Result(_));
            self.acks.lock().unwrap().push((packet.sequence, success));
            Ok(())
        }

        fn on_timeout(&self, packet: &Packet) -> ChannelResult<()> {
            self.timeouts.lock().unwrap().push(packet.sequence);
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Sequencing and ordering
    // -----------------------------------------------------------------------

    #[test]
    fn send_assigns_increasing_sequences() {
        let link = link();
        let s1 = link.send(Side::A, vec![1], Timeout::at_timestamp(100)).unwrap();
        let s2 = link.send(Side::A, vec![2], Timeout::at_timestamp(100)).unwrap();
        assert_eq!((s1, s2), (1, 2));
    }

    #[test]
    fn sequences_are_per_endpoint() {
        let link = link();
        let a1 = link.send(Side::A, vec![], Timeout::at_timestamp(100)).unwrap();
        let b1 = link.send(Side::B, vec![], Timeout::at_timestamp(100)).unwrap();
        assert_eq!((a1, b1), (1, 1));
    }

    #[test]
    fn packets_deliver_in_send_order() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        link.send(Side::A, vec![1], Timeout::at_timestamp(100)).unwrap();
        link.send(Side::A, vec![2], Timeout::at_timestamp(100)).unwrap();
        link.run_until_idle(&a, &b).unwrap();
        assert_eq!(*b.recvs.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn acks_deliver_in_packet_send_order() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        link.send(Side::A, vec![1], Timeout::at_timestamp(100)).unwrap();
        link.send(Side::A, vec![2], Timeout::at_timestamp(100)).unwrap();
        link.run_until_idle(&a, &b).unwrap();
        let acks: Vec<u64> = a.acks.lock().unwrap().iter().map(|(s, _)| *s).collect();
        assert_eq!(acks, vec![1, 2]);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[test]
    fn packet_walks_sent_received_acked() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        let seq = link.send(Side::A, vec![], Timeout::at_timestamp(100)).unwrap();
        assert_eq!(link.packet_state(Side::A, seq), Some(PacketState::Sent));

        link.step(&a, &b).unwrap(); // deliver
        assert_eq!(link.packet_state(Side::A, seq), Some(PacketState::Received));

        link.step(&a, &b).unwrap(); // ack back
        assert_eq!(
            link.packet_state(Side::A, seq),
            Some(PacketState::Acked { success: true })
        );
    }

    #[test]
    fn delivery_is_at_most_once() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        link.send(Side::A, vec![], Timeout::at_timestamp(100)).unwrap();
        link.run_until_idle(&a, &b).unwrap();
        // Idle link: nothing further happens.
        assert_eq!(link.step(&a, &b).unwrap(), None);
        assert_eq!(b.recvs.lock().unwrap().len(), 1);
        assert_eq!(a.acks.lock().unwrap().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Timeouts
    // -----------------------------------------------------------------------

    #[test]
    fn elapsed_packet_times_out_instead_of_delivering() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        let seq = link.send(Side::A, vec![], Timeout::at_timestamp(50)).unwrap();
        link.advance_time(Side::B, 100);

        let events = link.run_until_idle(&a, &b).unwrap();
        assert_eq!(
            events,
            vec![RelayEvent::TimedOut {
                side: Side::A,
                sequence: seq
            }]
        );
        assert_eq!(link.packet_state(Side::A, seq), Some(PacketState::TimedOut));
        // Exactly one of {ack, timeout}: the receiver never saw the packet
        // and the sender never got an ack.
        assert!(b.recvs.lock().unwrap().is_empty());
        assert!(a.acks.lock().unwrap().is_empty());
        assert_eq!(*a.timeouts.lock().unwrap(), vec![seq]);
    }

    #[test]
    fn timeout_is_judged_by_destination_clock() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RecordingHandler::default();
        // Sender's clock is far ahead, but the destination has not reached
        // the threshold.
        link.advance_time(Side::A, 1_000_000);
        link.send(Side::A, vec![], Timeout::at_timestamp(50)).unwrap();
        link.run_until_idle(&a, &b).unwrap();
        assert_eq!(b.recvs.lock().unwrap().len(), 1);
        assert!(a.timeouts.lock().unwrap().is_empty());
    }

    #[test]
    fn consensus_clocks_are_independent() {
        let link = link();
        link.advance_time(Side::A, 10);
        link.advance_time(Side::B, 25);
        assert_eq!(link.consensus_timestamp(Side::A), 10);
        assert_eq!(link.consensus_timestamp(Side::B), 25);
    }

    // -----------------------------------------------------------------------
    // Error acknowledgements
    // -----------------------------------------------------------------------

    /// Receiver that rejects everything.
    struct RejectingHandler;

    impl PacketHandler for RejectingHandler {
        fn on_recv(&self, _packet: &Packet) -> AckEnvelope {
            AckEnvelope::error("no thanks")
        }

        fn on_acknowledgement(&self, _: &Packet, _: &AckEnvelope) -> ChannelResult<()> {
            Ok(())
        }

        fn on_timeout(&self, _: &Packet) -> ChannelResult<()> {
            Ok(())
        }
    }

    #[test]
    fn error_ack_travels_back_and_marks_failure() {
        let link = link();
        let a = RecordingHandler::default();
        let b = RejectingHandler;
        let seq = link.send(Side::A, vec![], Timeout::at_timestamp(100)).unwrap();
        link.run_until_idle(&a, &b).unwrap();
        assert_eq!(
            link.packet_state(Side::A, seq),
            Some(PacketState::Acked { success: false })
        );
        assert_eq!(*a.acks.lock().unwrap(), vec![(seq, false)]);
    }
}
