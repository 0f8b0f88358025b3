//! The module registry every runtime chunk starts with.
//!
//! Chunks register factories with `__fardel__.define({ id: factory })` and
//! start entry modules with `__fardel__.run([id, ...])`. `require` carries
//! three helpers used by generated code: `require.i` (ES module interop),
//! `require.r` (re-export all) and `require.m` (throw for an ignored
//! request).

pub const GLOBAL: &str = "__fardel__";

pub const RUNTIME: &str = r#"(function (global) {
  if (global.__fardel__) return;
  var modules = {};
  var cache = {};
  function require(id) {
    var cached = cache[id];
    if (cached) return cached.exports;
    var factory = modules[id];
    if (!factory) throw new Error("Cannot find module '" + id + "'");
    var module = (cache[id] = { id: id, exports: {} });
    factory.call(module.exports, module, module.exports, require);
    return module.exports;
  }
  require.i = function (mod) {
    if (mod && mod.__esModule) return mod;
    var ns = { default: mod };
    if (mod !== null && typeof mod === "object") {
      for (var key in mod) if (key !== "default") ns[key] = mod[key];
    }
    return ns;
  };
  require.r = function (target, source) {
    for (var key in source) {
      if (key !== "default" && !Object.prototype.hasOwnProperty.call(target, key)) {
        target[key] = source[key];
      }
    }
  };
  require.m = function (request) {
    var error = new Error("Cannot find module '" + request + "'");
    error.code = "MODULE_NOT_FOUND";
    throw error;
  };
  global.__fardel__ = {
    define: function (factories) {
      for (var id in factories) if (!(id in modules)) modules[id] = factories[id];
    },
    run: function (ids) {
      for (var i = 0; i < ids.length; i++) require(ids[i]);
    },
    require: require
  };
})(typeof globalThis !== "undefined" ? globalThis : typeof self !== "undefined" ? self : this);
"#;
