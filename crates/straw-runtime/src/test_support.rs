use std::cell::RefCell;
use std::rc::Rc;

use straw_core::StrawValue;
use straw_host::{ActivationKind, MemoryHost, Reaction};

use crate::node::SharedHost;

/// window -> animation -> [button, slider], matching the demo application.
pub(crate) fn demo_host() -> (SharedHost, Rc<RefCell<MemoryHost>>) {
    let mut host = MemoryHost::new("SimpleAutomation");
    let window = host.create("window", "DocumentWindow");
    let animation = host.create("animation", "AutomationDemo");
    let button = host.create("button", "TextButton");
    let slider = host.create("slider", "CustomSlider");

    host.add_root(window).expect("root");
    host.add_child(window, animation).expect("animation");
    host.add_child(animation, button).expect("button");
    host.add_child(animation, slider).expect("slider");

    host.set_property(button, "example", 1337).expect("property");
    host.add_reaction(
        button,
        Reaction::ToggleVisible {
            target: Some("slider".to_string()),
        },
    )
    .expect("reaction");

    host.set_activation("CustomSlider", ActivationKind::None);
    host.register_capability("CustomSlider", "customMethod", |_, _, _| {
        Ok(StrawValue::from("Called customMethod !"))
    });
    host.register_capability("CustomSlider", "scaled", |_, _, args| {
        let factor = args.first().and_then(StrawValue::as_f64).unwrap_or(1.0);
        Ok(StrawValue::Float(0.5 * factor))
    });

    let memory = Rc::new(RefCell::new(host));
    let shared: SharedHost = memory.clone();
    (shared, memory)
}
