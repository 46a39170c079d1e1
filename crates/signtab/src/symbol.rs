use std::{cell::RefCell, collections::HashMap, fmt};

scoped_tls::scoped_thread_local!(static SESSION_GLOBALS: SessionGlobals);

/// Per-session state. Interned symbols are only meaningful inside the
/// session that created them.
pub(crate) struct SessionGlobals {
    symbol_interner: Interner,
}

/// Runs `f` with a symbol interner installed. Nested calls reuse the
/// interner of the outermost session.
pub fn session<R>(f: impl FnOnce() -> R) -> R {
    if SESSION_GLOBALS.is_set() {
        f()
    } else {
        let globals = SessionGlobals {
            symbol_interner: Interner::default(),
        };
        SESSION_GLOBALS.set(&globals, f)
    }
}

fn with_session_globals<R>(f: impl FnOnce(&SessionGlobals) -> R) -> R {
    SESSION_GLOBALS.with(f)
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Maps a string to its interned representation.
    pub fn intern(string: &str) -> Self {
        with_session_globals(|session_globals| session_globals.symbol_interner.intern(string))
    }

    /// Access the underlying string.
    ///
    /// The returned lifetime is not tied to `&self` but to the interner of
    /// the current session, which outlives every symbol handed out by it.
    pub fn as_str(&self) -> &str {
        with_session_globals(|session_globals| unsafe {
            std::mem::transmute::<&str, &str>(session_globals.symbol_interner.get(*self))
        })
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::intern(s)
    }
}

#[derive(Default)]
struct Interner(RefCell<InternerInner>);

#[derive(Default)]
struct InternerInner {
    names: HashMap<&'static str, Symbol>,
    strings: Vec<Box<str>>,
}

impl Interner {
    fn intern(&self, string: &str) -> Symbol {
        let mut inner = self.0.borrow_mut();
        if let Some(&name) = inner.names.get(string) {
            return name;
        }

        let name = Symbol(inner.strings.len() as u32);
        let boxed: Box<str> = string.into();

        // SAFETY: the heap allocation behind `boxed` never moves and is only
        // freed together with the interner, after `names` is gone.
        let key: &'static str = unsafe { &*(boxed.as_ref() as *const str) };
        inner.strings.push(boxed);
        inner.names.insert(key, name);
        name
    }

    // `Symbol::as_str()` should be used in preference to this function.
    fn get(&self, symbol: Symbol) -> &str {
        let inner = self.0.borrow();
        let s: &str = &inner.strings[symbol.0 as usize];
        // SAFETY: see `intern`; strings are never removed.
        unsafe { &*(s as *const str) }
    }
}

mod serde {
    use super::Symbol;
    use ::serde::de::{Deserializer, Error, Visitor};
    use std::fmt;

    struct SymbolVisitor;

    impl<'de> Visitor<'de> for SymbolVisitor {
        type Value = Symbol;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an atom name")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(Symbol::intern(v))
        }
    }

    impl serde::Serialize for Symbol {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> serde::Deserialize<'de> for Symbol {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_str(SymbolVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_stable() {
        session(|| {
            let a = Symbol::intern("p0,1");
            let b = Symbol::intern("q");
            assert_eq!(a, Symbol::intern("p0,1"));
            assert_ne!(a, b);
            assert_eq!("p0,1", a.as_str());
            assert_eq!("q", b.to_string());
        });
    }

    #[test]
    fn nested_sessions_share_interner() {
        session(|| {
            let a = Symbol::intern("a");
            session(|| assert_eq!(a, Symbol::intern("a")));
        });
    }

    #[test]
    fn serde_as_string() {
        session(|| {
            let a = Symbol::intern("x12");
            let json = serde_json::to_string(&a).unwrap();
            assert_eq!("\"x12\"", json);
            let back: Symbol = serde_json::from_str(&json).unwrap();
            assert_eq!(a, back);
        });
    }
}
