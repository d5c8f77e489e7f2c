//! Host-binding surface: a flat, string-in/string-out `wasm-bindgen` API
//! mirroring the CLI verbs one-for-one, for a browser host.
//!
//! This is the Rust/wasm equivalent of the emscripten bindings in
//! `examples/original_source/src/lattice/main.cpp`'s
//! `EMSCRIPTEN_BINDINGS(lattice)` block — same verb set, same global
//! single-session state (a browser tab drives exactly one lattice
//! session), translated to the ecosystem-standard `wasm-bindgen` idiom
//! rather than re-implemented as an emscripten-style C ABI.

use std::cell::RefCell;
use std::collections::HashSet;

use lattice_core::Point;
use lattice_engine::TriSet;
use wasm_bindgen::prelude::*;

struct Session {
    ts: TriSet,
    running: HashSet<Point>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Result<R, JsValue> {
    SESSION.with(|cell| {
        let mut slot = cell.borrow_mut();
        let session = slot
            .as_mut()
            .ok_or_else(|| JsValue::from_str("lattice session not initialized: call init(n) first"))?;
        Ok(f(session))
    })
}

/// Start a new session of dimension `n`, discarding any prior session.
#[wasm_bindgen]
pub fn init(n: usize) {
    SESSION.with(|cell| {
        *cell.borrow_mut() = Some(Session {
            ts: TriSet::new(n),
            running: HashSet::new(),
        });
    });
}

#[wasm_bindgen]
pub fn mark_true(s: String) -> Result<bool, JsValue> {
    with_session(|session| {
        let p = Point::parse(&s, session.ts.n());
        session.running.remove(&p);
        session.ts.mark_true(&p)
    })?
    .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub fn mark_false(s: String) -> Result<bool, JsValue> {
    with_session(|session| {
        let p = Point::parse(&s, session.ts.n());
        session.running.remove(&p);
        session.ts.mark_false(&p)
    })?
    .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub fn mark_improbable(s: String) -> Result<bool, JsValue> {
    with_session(|session| {
        let p = Point::parse(&s, session.ts.n());
        session.running.remove(&p);
        session.ts.mark_improbable(&p)
    })?
    .map_err(|err| JsValue::from_str(&err.to_string()))
}

/// `[|us|, |sup|, |zs|, |inf|, |ds|, |running|, best_hier(us), best_hier(ds)]`.
#[wasm_bindgen]
pub fn summary() -> Result<Vec<usize>, JsValue> {
    with_session(|session| {
        vec![
            session.ts.us().len(),
            session.ts.sup().len(),
            session.ts.zs().len(),
            session.ts.inf().len(),
            session.ts.ds().len(),
            session.running.len(),
            session.ts.us().best_hier().unwrap_or(usize::MAX),
            session.ts.ds().best_hier().unwrap_or(usize::MAX),
        ]
    })
}

fn points_to_strings<'a>(points: impl Iterator<Item = &'a Point>) -> Vec<String> {
    points.map(|p| p.to_string()).collect()
}

#[wasm_bindgen]
pub fn list_true() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.ts.us().iter()))
}

#[wasm_bindgen]
pub fn list_suprema() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.ts.sup()))
}

#[wasm_bindgen]
pub fn list_improbable() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.ts.zs()))
}

#[wasm_bindgen]
pub fn list_infima() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.ts.inf()))
}

#[wasm_bindgen]
pub fn list_false() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.ts.ds().iter()))
}

#[wasm_bindgen]
pub fn list_running() -> Result<Vec<String>, JsValue> {
    with_session(|session| points_to_strings(session.running.iter()))
}

fn next_fresh(ts: &mut TriSet, running: &mut HashSet<Point>, upward: bool) -> Point {
    loop {
        let candidate = if upward { ts.next_u() } else { ts.next_d() };
        if !candidate.is_present() || running.insert(candidate.clone()) {
            return candidate;
        }
    }
}

#[wasm_bindgen]
pub fn next_u() -> Result<String, JsValue> {
    with_session(|session| next_fresh(&mut session.ts, &mut session.running, true).to_string())
}

#[wasm_bindgen]
pub fn next_d() -> Result<String, JsValue> {
    with_session(|session| next_fresh(&mut session.ts, &mut session.running, false).to_string())
}

#[wasm_bindgen]
pub fn cancelled() -> Result<Vec<String>, JsValue> {
    with_session(|session| {
        let decided: Vec<Point> = session
            .running
            .iter()
            .filter(|p| session.ts.is_decided(p))
            .cloned()
            .collect();
        for p in &decided {
            session.running.remove(p);
        }
        points_to_strings(decided.iter())
    })
}

#[wasm_bindgen]
pub fn finalize() -> Result<(), JsValue> {
    with_session(|session| session.ts.check_all())
}
