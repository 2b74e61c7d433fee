//! Integration tests: struct handlers chained through follow-up topics.

use std::sync::{Arc, Mutex};

use quadfall_bus::{Dispatcher, Event, Handler};

#[derive(Debug, Clone, PartialEq)]
enum Msg {
    Request(u32),
    Reply(u32),
}

/// Answers every request with a reply of double the value.
struct Doubler;

impl Handler<Msg> for Doubler {
    fn handle(&self, bus: &Dispatcher<Msg>, event: &Event<Msg>) {
        if let Msg::Request(n) = event.payload {
            bus.publish("reply", Msg::Reply(n * 2));
        }
    }
}

#[derive(Default)]
struct Collector {
    seen: Mutex<Vec<Msg>>,
}

impl Handler<Msg> for Collector {
    fn handle(&self, _bus: &Dispatcher<Msg>, event: &Event<Msg>) {
        self.seen.lock().unwrap().push(event.payload.clone());
    }
}

#[test]
fn test_struct_handlers_chain_follow_up_topics() {
    let bus = Arc::new(Dispatcher::<Msg>::new());
    let collector = Arc::new(Collector::default());

    bus.subscribe("request", Arc::new(Doubler));
    bus.subscribe("reply", collector.clone());

    bus.publish("request", Msg::Request(5));
    bus.publish("request", Msg::Request(21));

    assert_eq!(
        *collector.seen.lock().unwrap(),
        vec![Msg::Reply(10), Msg::Reply(42)]
    );
}

#[test]
fn test_one_handler_on_several_topics() {
    let bus = Dispatcher::<Msg>::new();
    let collector = Arc::new(Collector::default());

    bus.subscribe("request", collector.clone());
    bus.subscribe("reply", collector.clone());

    bus.publish("request", Msg::Request(1));
    bus.publish("reply", Msg::Reply(2));
    bus.publish("other", Msg::Reply(3));

    assert_eq!(
        *collector.seen.lock().unwrap(),
        vec![Msg::Request(1), Msg::Reply(2)]
    );
    assert_eq!(bus.subscriber_count("request"), 1);
    assert_eq!(bus.subscriber_count("reply"), 1);
}

#[test]
fn test_concurrent_subscribe_and_publish_do_not_deadlock() {
    let bus = Arc::new(Dispatcher::<Msg>::new());
    let collector = Arc::new(Collector::default());
    bus.subscribe("request", Arc::new(Doubler));
    bus.subscribe("reply", collector.clone());

    let publishers: Vec<_> = (0..4)
        .map(|i| {
            let bus = Arc::clone(&bus);
            std::thread::spawn(move || {
                for n in 0..50 {
                    bus.publish("request", Msg::Request(i * 100 + n));
                }
            })
        })
        .collect();
    let subscriber = {
        let bus = Arc::clone(&bus);
        std::thread::spawn(move || {
            for _ in 0..50 {
                bus.subscribe_fn("noise", |_: &Dispatcher<Msg>, _: &Event<Msg>| {});
            }
        })
    };

    for t in publishers {
        t.join().unwrap();
    }
    subscriber.join().unwrap();

    assert_eq!(collector.seen.lock().unwrap().len(), 200);
    assert_eq!(bus.subscriber_count("noise"), 50);
}
