/*!
 * # Editing Core
 *
 * The inverse direction of the engine: structured edits on the rendered
 * view compiled back into byte-exact patches on the raw annotated text.
 *
 * ## Architecture
 *
 * - **Single source of truth**: the whole document lives in one
 *   `xi_rope::Rope` buffer. Nothing is ever regenerated from the block
 *   list; edits splice the existing bytes, so untouched content
 *   round-trips verbatim.
 * - **Command-based editing**: every edit is a [`Cmd`] compiled to an
 *   xi-rope `Delta`. Commands address their target by 1-based line
 *   number, the same addressing the parsed blocks carry.
 * - **Copy-on-write**: [`RawDocument::apply`] is pure: it returns a new
 *   document (rope clones share structure, so this is cheap) plus a
 *   [`Patch`] with the changed ranges and new version. Holders of the old
 *   document keep a stable snapshot; the caller serializes concurrent
 *   edits.
 * - **Boundary re-derivation**: commands re-scan the *current* buffer to
 *   find the governing question's line range. A stale cached block list
 *   would point at shifted lines after an insert/delete; the live text
 *   cannot.
 * - **Silent degradation**: a command whose target line or marker cannot
 *   be found compiles to the identity delta. The one hard guarantee is
 *   that unrelated text is never altered.
 *
 * After every applied command the caller re-runs the forward parse; the
 * scan is linear and cheap, so no incremental block maintenance exists.
 */

pub mod commands;
pub mod document;
pub mod patch;

pub use commands::Cmd;
pub use document::RawDocument;
pub use patch::Patch;
