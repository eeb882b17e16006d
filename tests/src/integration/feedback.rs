//! # Feedback Loop Tests
//!
//! A handler that re-emits its own trigger must be capped at the
//! configured ceiling without hanging or overflowing the stack, and the
//! bus must keep working for everything else.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use shared_bus::{
        BusConfig, EventBus, EventEnvelope, EventType, GameEvent, HandlerOutcome,
        SubscribeOptions,
    };
    use shared_types::{LayerId, LevelId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn looping_bus(ceiling: u32, window: Duration) -> EventBus {
        EventBus::with_config(BusConfig {
            loop_ceiling: ceiling,
            loop_window: window,
            ..BusConfig::default()
        })
    }

    #[test]
    fn recursive_reemission_is_capped_at_ceiling() {
        let bus = looping_bus(8, Duration::from_secs(60));
        let deliveries = Arc::new(AtomicUsize::new(0));

        let deliveries_in_handler = deliveries.clone();
        let bus_in_handler = bus.clone();
        bus.subscribe(
            EventType::SaveRequested,
            move |envelope| {
                deliveries_in_handler.fetch_add(1, Ordering::SeqCst);
                // Re-emit the exact trigger: same type, same source.
                bus_in_handler.emit(envelope.clone());
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default(),
        );

        let envelope = EventEnvelope::new(GameEvent::SaveRequested {
            level: LevelId::new("workshop-09"),
        })
        .with_source("progress");
        bus.emit(envelope);

        assert_eq!(deliveries.load(Ordering::SeqCst), 8);
        assert_eq!(bus.stats().dropped_events, 1);
    }

    #[test]
    fn other_keys_unaffected_by_a_capped_loop() {
        let bus = looping_bus(2, Duration::from_secs(60));
        let cleared = Arc::new(AtomicUsize::new(0));

        let bus_in_handler = bus.clone();
        bus.subscribe(
            EventType::SaveRequested,
            move |envelope| {
                bus_in_handler.emit(envelope.clone());
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default(),
        );
        let cleared_in_handler = cleared.clone();
        bus.subscribe(
            EventType::LayerCleared,
            move |_| {
                cleared_in_handler.fetch_add(1, Ordering::SeqCst);
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default(),
        );

        bus.emit(
            EventEnvelope::new(GameEvent::SaveRequested {
                level: LevelId::new("workshop-01"),
            })
            .with_source("progress"),
        );
        assert_eq!(bus.stats().dropped_events, 1);

        // A different (type, source) key still flows normally.
        let invoked = bus.emit(
            EventEnvelope::new(GameEvent::LayerCleared { layer: LayerId(0) })
                .with_source("shape-lifecycle"),
        );
        assert_eq!(invoked, 1);
        assert_eq!(cleared.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn window_expiry_restores_delivery() {
        let bus = looping_bus(1, Duration::from_millis(25));
        let deliveries = Arc::new(AtomicUsize::new(0));
        let deliveries_in_handler = deliveries.clone();
        bus.subscribe(
            EventType::PhysicsSettled,
            move |_| {
                deliveries_in_handler.fetch_add(1, Ordering::SeqCst);
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default(),
        );

        let settle = || {
            EventEnvelope::new(GameEvent::PhysicsSettled { sleeping_bodies: 12 })
                .with_source("physics")
        };

        assert_eq!(bus.emit(settle()), 1);
        // Inside the window: refused.
        assert_eq!(bus.emit(settle()), 0);

        std::thread::sleep(Duration::from_millis(30));
        // Window aged out: delivery resumes.
        assert_eq!(bus.emit(settle()), 1);
        assert_eq!(deliveries.load(Ordering::SeqCst), 2);
        assert_eq!(bus.stats().dropped_events, 1);
    }

    #[test]
    fn missing_source_keys_as_unknown() {
        let bus = looping_bus(1, Duration::from_secs(60));
        let seen_sources: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = seen_sources.clone();
        bus.subscribe(
            EventType::LayerCleared,
            move |envelope| {
                seen_in_handler.lock().push(envelope.source.clone());
                Ok(HandlerOutcome::Completed)
            },
            SubscribeOptions::default(),
        );

        // Two source-less emissions share the "unknown" key.
        bus.emit(GameEvent::LayerCleared { layer: LayerId(0) });
        assert_eq!(bus.emit(GameEvent::LayerCleared { layer: LayerId(0) }), 0);

        // A named source is a different key and still goes through.
        let invoked = bus.emit(
            EventEnvelope::new(GameEvent::LayerCleared { layer: LayerId(0) })
                .with_source("shape-lifecycle"),
        );
        assert_eq!(invoked, 1);
        assert_eq!(seen_sources.lock().len(), 2);
    }
}
