//! Lockstep guarantees of the shared name sequence

use dns_cache_channel::sequencer::{MAX_NAME_LEN, MIN_NAME_LEN};
use dns_cache_channel::{BitChannel, NameSequencer, Pacer, Prober, Resolution, ResolveStatus, Resolver};

struct Silent;

impl Resolver for Silent {
    fn resolve(&mut self, _name: &str) -> Resolution {
        Resolution {
            elapsed_ms: 100,
            status: ResolveStatus::NameNotFound,
        }
    }
}

#[test]
fn test_independent_sequencers_agree() {
    for seed in [0u32, 1, 20_000, 0x8000_0000, u32::MAX] {
        let mut a = NameSequencer::new(seed);
        let mut b = NameSequencer::new(seed);
        for i in 0..5_000 {
            assert_eq!(a.next_name(), b.next_name(), "seed {} name {}", seed, i);
        }
    }
}

#[test]
fn test_every_name_is_well_formed() {
    let mut seq = NameSequencer::new(19_000);
    let mut lengths = std::collections::BTreeSet::new();

    for _ in 0..10_000 {
        let n = seq.peek_len();
        let name = seq.next_name();
        assert_eq!(name.len(), n);

        let (label, tld) = name.split_once('.').expect("name has a dot");
        assert_eq!(tld.len(), 3);
        assert!(!label.is_empty());
        assert!(name.bytes().filter(|&b| b != b'.').all(|b| b.is_ascii_lowercase()));
        lengths.insert(n);
    }

    // Every length in range shows up
    assert_eq!(lengths.into_iter().collect::<Vec<_>>(), (MIN_NAME_LEN..=MAX_NAME_LEN).collect::<Vec<_>>());
}

#[test]
fn test_transmitter_and_receiver_draw_in_lockstep() {
    let bytes = [0x00u8, 0xFF, 0xA5, 0x3C];

    let mut tx = BitChannel::new(NameSequencer::new(8), Prober::new(Silent), Pacer::unthrottled(8), 10);
    tx.send_bytes(&bytes).unwrap();

    let mut rx = BitChannel::new(NameSequencer::new(8), Prober::new(Silent), Pacer::unthrottled(8), 10);
    let mut buf = [0u8; 4];
    rx.receive_into(&mut buf).unwrap();

    // Different probe counts, same number of names drawn
    assert_eq!(tx.prober().probes(), 8 + 4 + 4);
    assert_eq!(rx.prober().probes(), 32);
    assert_eq!(tx.sequencer(), rx.sequencer());
}
