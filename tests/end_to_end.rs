// tests/end_to_end.rs
#![cfg(feature = "alloc")]

use bender_serial::common::BenderSerial;
use bender_serial::component::{generate, BenderSerialSensor, CodegenContext, ConfigValue, IdRegistry};
use bender_serial::{BenderMonitor, BenderNumber};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

struct Uart(VecDeque<u8>);

impl BenderSerial for Uart {
    type Error = ();

    fn read_byte(&mut self) -> nb::Result<u8, ()> {
        self.0.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

#[test]
fn config_drives_monitor() {
    let mut registry = IdRegistry::new();
    let mut ctx = CodegenContext::new();
    registry.declare_uart_bus("uart_bus").unwrap();
    ctx.declare_variable("uart_bus").unwrap();

    let raw = ConfigValue::map([
        ("id", ConfigValue::from("ground_fault")),
        ("sensitivity", ConfigValue::Int(4)),
        ("update_interval", ConfigValue::from("30s")),
    ]);
    let config = generate::<BenderSerialSensor>(&raw, &mut registry, &mut ctx).unwrap();
    assert!(ctx.render().contains("ground_fault->set_sensitivity(4);\n"));

    let data = b"BGF 0 1 100024 7291 72 47890 *7F\r\nBGF 1 1 100056 13508 135 11505 *D3\r\n";
    let published = Rc::new(RefCell::new(Vec::new()));
    let sink = |tag: &'static str| {
        let published = Rc::clone(&published);
        Box::new(move |state: f32| published.borrow_mut().push((tag, state))) as Box<dyn FnMut(f32)>
    };

    let mut monitor = BenderMonitor::new(Uart(data.iter().copied().collect()));
    monitor.apply(&config);
    monitor.register_bender(BenderNumber::new(0).unwrap(), sink("status"), sink("resistance"));
    monitor.setup();

    assert_eq!(monitor.sensitivity().get(), 4);
    assert_eq!(monitor.update_interval().map(|i| i.as_millis()), Some(30_000));
    assert_eq!(monitor.poll(), Ok(2));
    assert_eq!(*published.borrow(), vec![("status", 1.0), ("resistance", 47_890.0)]);
}

#[cfg(feature = "serde")]
#[test]
fn config_from_json() {
    let raw: ConfigValue =
        serde_json::from_str(r#"{"sensitivity": 12, "update_interval": "never", "setup_priority": 800.0}"#)
            .unwrap();
    let mut registry = IdRegistry::new();
    let mut ctx = CodegenContext::new();
    registry.declare_uart_bus("uart_bus").unwrap();
    ctx.declare_variable("uart_bus").unwrap();

    let config = generate::<BenderSerialSensor>(&raw, &mut registry, &mut ctx).unwrap();
    assert_eq!(config.sensitivity.get(), 12);
    assert_eq!(
        ctx.render(),
        "auto *bender_serial_sensor_benderserialsensor = new bender_serial_sensor::BenderSerialSensor();\n\
         bender_serial_sensor_benderserialsensor->set_setup_priority(800.0f);\n\
         App.register_component(bender_serial_sensor_benderserialsensor);\n\
         bender_serial_sensor_benderserialsensor->set_uart_parent(uart_bus);\n\
         bender_serial_sensor_benderserialsensor->set_sensitivity(12);\n\
         bender_serial_sensor_benderserialsensor->set_update_interval(4294967295);\n"
    );
}
