use std::cell::RefCell;
use std::rc::Rc;

use rhai::{
    Array, Dynamic, Engine, EvalAltResult, ImmutableString, Map, Module, NativeCallContext,
    Position,
};
use straw_core::Failure;

use crate::assertions::{check_comparison, check_truth, Predicate};
use crate::bridge::{
    dynamic_is_truthy, failure_at, info_to_map, properties_to_map, render_dynamic,
    straw_arguments, straw_operand, straw_to_dynamic, BridgeResult,
};
use crate::node::ComponentNode;
use crate::session::{raise_failure, Straw};

pub(crate) const MODULE_NAME: &str = "straw";

/// Methods every handle has; host capabilities with these names are not bound.
const NODE_METHODS: &[&str] = &[
    "getComponentID",
    "typeName",
    "isVisible",
    "isShowing",
    "isAttached",
    "getProperties",
    "getChildren",
    "info",
    "invoke",
    "to_string",
    "to_debug",
];

/// Variadic handler, given the call-site position of the script call.
type Variadic = Rc<dyn Fn(Position, &[Dynamic]) -> BridgeResult<()>>;

/// Diagnostic lines of the current run, shared by `log`, `print` and `debug`.
#[derive(Clone)]
pub(crate) struct ScriptLog {
    application_name: String,
    lines: Rc<RefCell<Vec<String>>>,
}

impl ScriptLog {
    pub(crate) fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            lines: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn write(&self, message: &str) {
        let line = format!("[{}] {}", self.application_name, message);
        tracing::info!(target: "straw::script", "{}", line);
        self.lines.borrow_mut().push(line);
    }

    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.borrow_mut())
    }
}

pub(crate) fn register_bindings(engine: &mut Engine, straw: &Straw, log: &ScriptLog) {
    register_failure_type(engine);
    register_component_type(engine);
    let declared = straw.host().borrow().declared_capabilities();
    register_capability_methods(engine, &declared);

    let sink = log.clone();
    engine.on_print(move |text| sink.write(text));
    let sink = log.clone();
    engine.on_debug(move |text, _, _| sink.write(text));

    engine.register_static_module(MODULE_NAME, straw_module(straw, log).into());
}

fn optional<T: Into<Dynamic>>(value: Option<T>) -> Dynamic {
    value.map_or(Dynamic::UNIT, Into::into)
}

/// Raises at the script position of the native call being served.
fn raise(ctx: &NativeCallContext, failure: Failure) -> Box<EvalAltResult> {
    failure_at(failure, ctx.call_position())
}

fn register_failure_type(engine: &mut Engine) {
    engine
        .register_type_with_name::<Failure>("Failure")
        .register_get("message", |failure: &mut Failure| failure.message.clone())
        .register_get("kind", |failure: &mut Failure| {
            failure.kind.as_str().to_string()
        })
        .register_get("predicate", |failure: &mut Failure| {
            optional(failure.predicate.clone())
        })
        .register_get("origin", |failure: &mut Failure| {
            optional(failure.origin.clone())
        })
        .register_fn("to_string", |failure: &mut Failure| failure.to_string());
}

fn register_component_type(engine: &mut Engine) {
    engine
        .register_type_with_name::<ComponentNode>("Component")
        .register_fn("getComponentID", |node: &mut ComponentNode| {
            optional(node.component_id())
        })
        .register_fn("typeName", |node: &mut ComponentNode| {
            optional(node.type_name())
        })
        .register_fn("isVisible", |node: &mut ComponentNode| {
            optional(node.is_visible())
        })
        .register_fn("isShowing", |node: &mut ComponentNode| {
            optional(node.is_showing())
        })
        .register_fn("isAttached", |node: &mut ComponentNode| node.is_attached())
        .register_fn("getProperties", |node: &mut ComponentNode| -> Map {
            node.properties()
                .map(|properties| properties_to_map(&properties))
                .unwrap_or_default()
        })
        .register_fn("getChildren", |node: &mut ComponentNode| -> Array {
            node.children().into_iter().map(Dynamic::from).collect()
        })
        .register_fn("info", |node: &mut ComponentNode| info_dynamic(node, false))
        .register_fn("info", |node: &mut ComponentNode, recursive: bool| {
            info_dynamic(node, recursive)
        })
        .register_fn(
            "invoke",
            |ctx: NativeCallContext,
             node: &mut ComponentNode,
             name: ImmutableString|
             -> BridgeResult<Dynamic> { invoke_node(&ctx, node, &name, &[]) },
        )
        .register_fn(
            "invoke",
            |ctx: NativeCallContext,
             node: &mut ComponentNode,
             name: ImmutableString,
             args: Array|
             -> BridgeResult<Dynamic> { invoke_node(&ctx, node, &name, &args) },
        )
        .register_fn("to_string", |node: &mut ComponentNode| node.to_string())
        .register_fn("to_debug", |node: &mut ComponentNode| node.to_string());
}

fn info_dynamic(node: &ComponentNode, recursive: bool) -> Dynamic {
    node.info(recursive)
        .map_or(Dynamic::UNIT, |info| Dynamic::from_map(info_to_map(&info)))
}

fn invoke_node(
    ctx: &NativeCallContext,
    node: &ComponentNode,
    name: &str,
    args: &[Dynamic],
) -> BridgeResult<Dynamic> {
    let args = straw_arguments(args, name).map_err(|failure| raise(ctx, failure))?;
    node.invoke(name, &args)
        .map(|value| straw_to_dynamic(&value))
        .map_err(|failure| raise(ctx, failure))
}

/// Binds each declared capability as a handle method taking up to three arguments.
fn register_capability_methods(engine: &mut Engine, names: &[String]) {
    for name in names {
        if NODE_METHODS.contains(&name.as_str()) {
            tracing::warn!(capability = %name, "capability shadows a built-in method; use invoke()");
            continue;
        }

        let method = name.clone();
        engine.register_fn(
            name.as_str(),
            move |ctx: NativeCallContext, node: &mut ComponentNode| {
                invoke_node(&ctx, node, &method, &[])
            },
        );
        let method = name.clone();
        engine.register_fn(
            name.as_str(),
            move |ctx: NativeCallContext, node: &mut ComponentNode, a: Dynamic| {
                invoke_node(&ctx, node, &method, &[a])
            },
        );
        let method = name.clone();
        engine.register_fn(
            name.as_str(),
            move |ctx: NativeCallContext, node: &mut ComponentNode, a: Dynamic, b: Dynamic| {
                invoke_node(&ctx, node, &method, &[a, b])
            },
        );
        let method = name.clone();
        engine.register_fn(
            name.as_str(),
            move |ctx: NativeCallContext,
                  node: &mut ComponentNode,
                  a: Dynamic,
                  b: Dynamic,
                  c: Dynamic| { invoke_node(&ctx, node, &method, &[a, b, c]) },
        );
    }
}

fn straw_module(straw: &Straw, log: &ScriptLog) -> Module {
    let mut module = Module::new();
    register_queries(&mut module, straw);
    register_interactions(&mut module, straw);
    register_assertions(&mut module);

    let raise_fn: Variadic = Rc::new(
        |position: Position, args: &[Dynamic]| -> BridgeResult<()> {
            let message = args.iter().map(render_dynamic).collect::<String>();
            Err(failure_at(raise_failure(&message), position))
        },
    );
    set_variadic_fn(&mut module, "raiseFailure", Rc::clone(&raise_fn));
    set_variadic_fn(&mut module, "throwException", raise_fn);

    let sink = log.clone();
    let write: Variadic = Rc::new(
        move |_: Position, args: &[Dynamic]| -> BridgeResult<()> {
            let message = args.iter().map(render_dynamic).collect::<Vec<_>>();
            sink.write(&message.join(" "));
            Ok(())
        },
    );
    set_variadic_fn(&mut module, "log", write);

    let session = straw.clone();
    module.set_native_fn(
        "quitApplication",
        move |ctx: NativeCallContext| -> BridgeResult<()> {
            session.quit().map_err(|failure| raise(&ctx, failure))
        },
    );

    module
}

fn register_queries(module: &mut Module, straw: &Straw) {
    for name in ["findComponentById", "findComponent"] {
        let session = straw.clone();
        module.set_native_fn(name, move |id: ImmutableString| -> BridgeResult<Dynamic> {
            Ok(session
                .find_by_id(&id)
                .map_or(Dynamic::UNIT, Dynamic::from))
        });
    }

    let session = straw.clone();
    module.set_native_fn(
        "findComponentsByType",
        move |type_name: ImmutableString| -> BridgeResult<Array> {
            Ok(session
                .find_by_type(&type_name)
                .into_iter()
                .map(Dynamic::from)
                .collect())
        },
    );

    let session = straw.clone();
    module.set_native_fn(
        "componentInfo",
        move |id: ImmutableString| -> BridgeResult<Dynamic> {
            Ok(session.find_by_id(&id).map_or(Dynamic::UNIT, |node| {
                info_dynamic(&node, false)
            }))
        },
    );
    let session = straw.clone();
    module.set_native_fn(
        "componentInfo",
        move |id: ImmutableString, recursive: bool| -> BridgeResult<Dynamic> {
            Ok(session.find_by_id(&id).map_or(Dynamic::UNIT, |node| {
                info_dynamic(&node, recursive)
            }))
        },
    );
}

fn register_interactions(module: &mut Module, straw: &Straw) {
    for name in ["clickComponent", "activate"] {
        let session = straw.clone();
        module.set_native_fn(
            name,
            move |ctx: NativeCallContext, id: ImmutableString| -> BridgeResult<()> {
                session.activate(&id).map_err(|failure| raise(&ctx, failure))
            },
        );
    }

    let name = "invokeComponentCustomMethod";
    let session = straw.clone();
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              id: ImmutableString,
              method: ImmutableString|
              -> BridgeResult<Dynamic> {
            invoke_by_id(&ctx, &session, &id, &method, &[])
        },
    );
    let session = straw.clone();
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              id: ImmutableString,
              method: ImmutableString,
              a: Dynamic|
              -> BridgeResult<Dynamic> {
            invoke_by_id(&ctx, &session, &id, &method, &[a])
        },
    );
    let session = straw.clone();
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              id: ImmutableString,
              method: ImmutableString,
              a: Dynamic,
              b: Dynamic|
              -> BridgeResult<Dynamic> {
            invoke_by_id(&ctx, &session, &id, &method, &[a, b])
        },
    );
    let session = straw.clone();
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              id: ImmutableString,
              method: ImmutableString,
              a: Dynamic,
              b: Dynamic,
              c: Dynamic|
              -> BridgeResult<Dynamic> {
            invoke_by_id(&ctx, &session, &id, &method, &[a, b, c])
        },
    );
}

fn invoke_by_id(
    ctx: &NativeCallContext,
    straw: &Straw,
    id: &str,
    name: &str,
    args: &[Dynamic],
) -> BridgeResult<Dynamic> {
    let args = straw_arguments(args, name).map_err(|failure| raise(ctx, failure))?;
    straw
        .invoke(id, name, &args)
        .map(|value| straw_to_dynamic(&value))
        .map_err(|failure| raise(ctx, failure))
}

fn register_assertions(module: &mut Module) {
    for predicate in Predicate::ALL {
        if predicate.is_unary() {
            module.set_native_fn(
                predicate.name(),
                move |ctx: NativeCallContext, value: Dynamic| -> BridgeResult<()> {
                    check_truth(predicate, dynamic_is_truthy(&value), &render_dynamic(&value))
                        .map_err(|failure| raise(&ctx, failure))
                },
            );
        } else {
            module.set_native_fn(
                predicate.name(),
                move |ctx: NativeCallContext, a: Dynamic, b: Dynamic| -> BridgeResult<()> {
                    let compared = straw_operand(&a, predicate.name()).and_then(|a| {
                        let b = straw_operand(&b, predicate.name())?;
                        check_comparison(predicate, &a, &b)
                    });
                    compared.map_err(|failure| raise(&ctx, failure))
                },
            );
        }
    }
}

/// Rhai resolves overloads by arity, so loosely typed variadic functions are
/// registered once per argument count, up to six.
fn set_variadic_fn(module: &mut Module, name: &str, handler: Variadic) {
    let call = Rc::clone(&handler);
    module.set_native_fn(name, move |ctx: NativeCallContext| call(ctx.call_position(), &[]));
    let call = Rc::clone(&handler);
    module.set_native_fn(name, move |ctx: NativeCallContext, a: Dynamic| {
        call(ctx.call_position(), &[a])
    });
    let call = Rc::clone(&handler);
    module.set_native_fn(name, move |ctx: NativeCallContext, a: Dynamic, b: Dynamic| {
        call(ctx.call_position(), &[a, b])
    });
    let call = Rc::clone(&handler);
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext, a: Dynamic, b: Dynamic, c: Dynamic| {
            call(ctx.call_position(), &[a, b, c])
        },
    );
    let call = Rc::clone(&handler);
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext, a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| {
            call(ctx.call_position(), &[a, b, c, d])
        },
    );
    let call = Rc::clone(&handler);
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              a: Dynamic,
              b: Dynamic,
              c: Dynamic,
              d: Dynamic,
              e: Dynamic| { call(ctx.call_position(), &[a, b, c, d, e]) },
    );
    module.set_native_fn(
        name,
        move |ctx: NativeCallContext,
              a: Dynamic,
              b: Dynamic,
              c: Dynamic,
              d: Dynamic,
              e: Dynamic,
              f: Dynamic| { handler(ctx.call_position(), &[a, b, c, d, e, f]) },
    );
}
