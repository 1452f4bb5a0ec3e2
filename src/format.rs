//! Wire format reference.
//!
//! This module documents the serialized scene encoding as read by this
//! crate. It contains no code; it exists so the format rules live next to
//! the implementation.
//!
//! # Document layout
//!
//! A document is a UTF-8 byte stream of newline-terminated lines:
//!
//! ```text
//! # Node.GL v<major>.<minor>.<micro>
//! <TAG><space?><key1>:<val1> <key2>:<val2> ...
//! <TAG> ...
//! ```
//!
//! **Header**: the first line must match `# Node.GL v<major>.<minor>.<micro>`
//! and the version triple must equal [`VERSION`](crate::VERSION) exactly.
//! There is no range or prefix compatibility: `1.0.1` is rejected by a
//! reader built for `1.0.0`.
//!
//! **Node lines**: each line instantiates one node. The first 4 bytes are
//! the type tag, followed by an optional single space, followed by
//! space-separated `key:value` parameter tokens. The last line's newline is
//! optional.
//!
//! # Value encodings
//!
//! | Type | Encoding |
//! |------|----------|
//! | `i32` / `u32` | decimal integer |
//! | `bool` | decimal integer; `-1` = unset, anything else collapses to 0/1 |
//! | `f32` / `f64` | `-`? + hex exponent + sentinel (`z`/`Z`) + hex mantissa |
//! | `rational` | `<num>/<den>` decimal pair |
//! | `flags` / `select` | bare token up to the next whitespace, matched against named constants |
//! | `str` | token up to the next whitespace, `%XY` hex-byte escapes decoded |
//! | `data` | `<size>,` followed by exactly `2*size` hex digits |
//! | `ivec2/3/4`, `uvec2/3/4`, `vec2/3/4`, `mat4` | comma-separated list of exactly N scalars |
//! | `node` | `!` + hex backward-reference id (a bare hex id is also accepted) |
//! | `nodelist` | comma-separated hex backward-reference ids |
//! | `f64list` | comma-separated bit-exact doubles |
//! | `nodedict` | comma-separated `key=hexid` pairs, keys at most 63 bytes |
//!
//! Additionally, any parameter whose descriptor allows node references may
//! be written as `!<hexid>` regardless of its declared type.
//!
//! # Bit-exact floats
//!
//! Decimal float text is ambiguous across locales and conversion routines,
//! so floats travel as their IEEE-754 bit pattern instead. The encoding is
//! sign, biased exponent and mantissa as separate hexadecimal fields:
//!
//! ```text
//! 1.0f32   ->  7fz0          (bits 0x3f800000)
//! -2.0f32  ->  -80z0         (bits 0xc0000000)
//! 1.0f64   ->  3ffZ0         (bits 0x3ff0000000000000)
//! NaN f32  ->  ffz400000     (bits 0x7fc00000)
//! ```
//!
//! The sentinel letter (`z` for 32-bit, `Z` for 64-bit) has no numeric
//! meaning; it only marks the exponent/mantissa boundary. A leading `-`
//! sets the sign bit. Either hex field may be empty, reading as zero, so
//! `0z0`, `z0` and `0z` all decode to `+0.0`.
//!
//! # Backward references
//!
//! A reference id `i` names the node created `i` steps before the node
//! whose line is being parsed: with `K` earlier nodes, id `i` resolves to
//! creation-order position `K - 1 - i`. Ids at or beyond `K` are hard
//! errors, and the node being built is not visible to its own line, so
//! self-references and cycles cannot be expressed.
//!
//! # Strings
//!
//! Tokens end at the first whitespace. Characters that cannot appear
//! literally (whitespace, `%` itself) are carried as `%XY` hex-byte
//! escapes. A `%` not followed by two hex digits inside the token is kept
//! literally. The decoded bytes must form valid UTF-8.
