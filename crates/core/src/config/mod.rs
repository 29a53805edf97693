//! The configuration model and the directive handlers that build it.
//!
//! [`ConfigBuilder`] is the shipped [`Handlers`] implementation: an
//! exhaustive match on [`CallId`], so a grammar handler without a semantic
//! counterpart fails to compile rather than silently doing nothing.

use crate::parser::handler::{HandlerCtx, Handlers};
use crate::parser::report::ErrorReply;
use crate::parser::{ParseContext, parse_with_handlers};
use lattice_cfg_diagnostics::{Code, Diagnostic};
use lattice_cfg_grammar::CallId;
use serde::Serialize;
use std::collections::BTreeSet;

/// Container split direction applied to new top-level containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Split along the horizontal axis.
    Horizontal,
    /// Split along the vertical axis.
    Vertical,
    /// Pick an axis from the output's aspect ratio.
    #[default]
    Auto,
}

/// Layout new workspaces start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceLayout {
    /// Regular tiling layout.
    #[default]
    Default,
    /// Stacked windows, one visible at a time.
    Stacking,
    /// Tabbed windows.
    Tabbed,
}

/// Whether a binding refers to a key symbol or a raw key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Bound by key symbol (`bindsym`).
    Sym,
    /// Bound by key code (`bindcode`).
    Code,
}

/// A single key binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Symbol or code binding.
    pub kind: BindingKind,
    /// Modifier names, in the order written.
    pub modifiers: Vec<String>,
    /// The key symbol or key code, as written.
    pub key: String,
    /// Trigger on key release instead of press.
    pub release: bool,
    /// The command to run.
    pub command: String,
}

/// A named binding mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mode {
    /// The mode's name.
    pub name: String,
    /// Bindings active while the mode is entered.
    pub bindings: Vec<Binding>,
}

/// A command executed at startup, or on every restart for `exec_always`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecCommand {
    /// The shell command.
    pub command: String,
    /// Re-run on in-place restarts too.
    pub always: bool,
}

/// A workspace pinned to an output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceAssignment {
    /// The workspace number (1-based).
    pub number: i64,
    /// The output the workspace is assigned to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// The configuration a parse produces. Directives that were absent or
/// invalid leave their built-in defaults in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// Font pattern for window titles and the bar.
    pub font: Option<String>,
    /// Modifier that drags floating windows.
    pub floating_modifier: Option<String>,
    /// Split direction for new top-level containers.
    pub default_orientation: Orientation,
    /// Layout new workspaces start in.
    pub workspace_layout: WorkspaceLayout,
    /// Whether focus follows the mouse pointer.
    pub focus_follows_mouse: bool,
    /// Whether focus wraps around at container edges.
    pub force_focus_wrapping: bool,
    /// Startup commands, in declaration order.
    pub execs: Vec<ExecCommand>,
    /// Top-level key bindings, in declaration order.
    pub bindings: Vec<Binding>,
    /// Binding modes, in declaration order.
    pub modes: Vec<Mode>,
    /// Workspace-to-output assignments, in declaration order.
    pub workspaces: Vec<WorkspaceAssignment>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: None,
            floating_modifier: None,
            default_orientation: Orientation::default(),
            workspace_layout: WorkspaceLayout::default(),
            focus_follows_mouse: true,
            force_focus_wrapping: false,
            execs: Vec::new(),
            bindings: Vec::new(),
            modes: Vec::new(),
            workspaces: Vec::new(),
        }
    }
}

/// Outcome of a config-building parse.
#[derive(Debug, Serialize)]
pub struct ConfigResult {
    /// The assembled configuration.
    pub config: Config,
    /// Diagnostics in source order, semantic checks last.
    pub diagnostics: Vec<Diagnostic>,
    /// One reply record per syntax error.
    pub replies: Vec<ErrorReply>,
}

/// Parse `input` into a [`Config`] and run the duplicate-binding check.
///
/// The input must already be variable-expanded (see
/// [`crate::variables::expand_variables`]); `set` lines are ignored by the
/// grammar.
pub fn parse_str(input: &str, context: &mut ParseContext) -> ConfigResult {
    let mut builder = ConfigBuilder::default();
    let result = parse_with_handlers(input, context, &mut builder);
    let mut diagnostics = result.diagnostics;
    let config = builder.into_config();
    check_duplicate_bindings(&config, context, &mut diagnostics);
    ConfigResult {
        config,
        diagnostics,
        replies: result.replies,
    }
}

/// Builds a [`Config`] from directive callbacks.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
    /// Index into `config.modes` while inside a `mode { … }` block.
    current_mode: Option<usize>,
}

impl ConfigBuilder {
    /// The assembled configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    fn binding_from(ctx: &HandlerCtx<'_>) -> Option<Binding> {
        let key = ctx.string("key")?.to_string();
        let command = ctx.string("command")?.to_string();
        let kind = match ctx.string("bindtype") {
            Some("bindcode") => BindingKind::Code,
            _ => BindingKind::Sym,
        };
        let modifiers = ctx
            .string("modifiers")
            .map(|m| m.split(',').map(str::to_owned).collect())
            .unwrap_or_default();
        let release = ctx.string("release").is_some();
        Some(Binding {
            kind,
            modifiers,
            key,
            release,
            command,
        })
    }

    fn enter_mode(&mut self, ctx: &HandlerCtx<'_>) {
        let Some(name) = ctx.string("modename") else {
            return;
        };
        // A second block for an existing mode appends to it.
        let index = match self.config.modes.iter().position(|m| m.name == name) {
            Some(i) => i,
            None => {
                self.config.modes.push(Mode {
                    name: name.to_string(),
                    bindings: Vec::new(),
                });
                self.config.modes.len() - 1
            }
        };
        self.current_mode = Some(index);
    }

    fn workspace(&mut self, ctx: &mut HandlerCtx<'_>) {
        let number = ctx.long("workspace");
        if number < 1 {
            ctx.diagnose(Diagnostic::new(
                Code::InvalidValue,
                format!("invalid workspace number {number}; workspaces are numbered from 1"),
            ));
            return;
        }
        let output = ctx.string("output").map(str::to_owned);
        self.config
            .workspaces
            .push(WorkspaceAssignment { number, output });
    }

    fn default_orientation(&mut self, ctx: &mut HandlerCtx<'_>) {
        let Some(value) = ctx.string("orientation").map(str::to_owned) else {
            return;
        };
        self.config.default_orientation = match value.to_ascii_lowercase().as_str() {
            "horizontal" => Orientation::Horizontal,
            "vertical" => Orientation::Vertical,
            "auto" => Orientation::Auto,
            _ => {
                ctx.diagnose(Diagnostic::new(
                    Code::InvalidValue,
                    format!("unknown orientation {value:?}; expected horizontal, vertical or auto"),
                ));
                return;
            }
        };
    }

    fn workspace_layout(&mut self, ctx: &mut HandlerCtx<'_>) {
        let Some(value) = ctx.string("layout").map(str::to_owned) else {
            return;
        };
        self.config.workspace_layout = match value.to_ascii_lowercase().as_str() {
            "default" => WorkspaceLayout::Default,
            "stacking" | "stacked" => WorkspaceLayout::Stacking,
            "tabbed" => WorkspaceLayout::Tabbed,
            _ => {
                ctx.diagnose(Diagnostic::new(
                    Code::InvalidValue,
                    format!(
                        "unknown workspace_layout {value:?}; expected default, stacking or tabbed"
                    ),
                ));
                return;
            }
        };
    }

    fn flag(ctx: &mut HandlerCtx<'_>, identifier: &str, directive: &str) -> Option<bool> {
        let value = ctx.string(identifier).map(str::to_owned)?;
        if value.eq_ignore_ascii_case("yes") {
            Some(true)
        } else if value.eq_ignore_ascii_case("no") {
            Some(false)
        } else {
            ctx.diagnose(Diagnostic::new(
                Code::InvalidValue,
                format!("{directive} expects yes or no, got {value:?}"),
            ));
            None
        }
    }
}

impl Handlers for ConfigBuilder {
    fn call(&mut self, call: CallId, ctx: &mut HandlerCtx<'_>) {
        match call {
            CallId::Font => {
                if let Some(font) = ctx.string("font") {
                    self.config.font = Some(font.to_string());
                }
            }
            CallId::Exec => {
                if let Some(command) = ctx.string("command") {
                    let always = ctx.string("exectype") == Some("exec_always");
                    self.config.execs.push(ExecCommand {
                        command: command.to_string(),
                        always,
                    });
                }
            }
            CallId::Binding => {
                if let Some(binding) = Self::binding_from(ctx) {
                    self.config.bindings.push(binding);
                }
            }
            CallId::EnterMode => self.enter_mode(ctx),
            CallId::ModeBinding => {
                if let (Some(binding), Some(index)) = (Self::binding_from(ctx), self.current_mode) {
                    self.config.modes[index].bindings.push(binding);
                }
            }
            CallId::LeaveMode => self.current_mode = None,
            CallId::Workspace => self.workspace(ctx),
            CallId::FloatingModifier => {
                if let Some(modifier) = ctx.string("modifiers") {
                    self.config.floating_modifier = Some(modifier.to_string());
                }
            }
            CallId::DefaultOrientation => self.default_orientation(ctx),
            CallId::WorkspaceLayout => self.workspace_layout(ctx),
            CallId::FocusFollowsMouse => {
                if let Some(value) = Self::flag(ctx, "value", "focus_follows_mouse") {
                    self.config.focus_follows_mouse = value;
                }
            }
            CallId::ForceFocusWrapping => {
                if let Some(value) = Self::flag(ctx, "value", "force_focus_wrapping") {
                    self.config.force_focus_wrapping = value;
                }
            }
        }
    }
}

/// Flags bindings that collide on kind, modifier set, key, and release
/// flag, within the same scope (top level or a single mode). Key
/// comparison is case-insensitive for symbol bindings.
pub fn check_duplicate_bindings(
    config: &Config,
    context: &mut ParseContext,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let scopes = std::iter::once(("default", &config.bindings))
        .chain(config.modes.iter().map(|m| (m.name.as_str(), &m.bindings)));
    for (scope, bindings) in scopes {
        for (i, current) in bindings.iter().enumerate() {
            if bindings[..i].iter().any(|earlier| collides(earlier, current)) {
                context.has_errors = true;
                diagnostics.push(Diagnostic::new(
                    Code::DuplicateBinding,
                    format!(
                        "duplicate binding in mode {scope}: {} runs {:?}",
                        key_combo(current),
                        current.command
                    ),
                ));
            }
        }
    }
}

fn collides(a: &Binding, b: &Binding) -> bool {
    if a.kind != b.kind || a.release != b.release {
        return false;
    }
    let key_matches = match a.kind {
        BindingKind::Sym => a.key.eq_ignore_ascii_case(&b.key),
        BindingKind::Code => a.key == b.key,
    };
    key_matches
        && a.modifiers.iter().collect::<BTreeSet<_>>() == b.modifiers.iter().collect::<BTreeSet<_>>()
}

fn key_combo(binding: &Binding) -> String {
    let mut combo = binding.modifiers.join("+");
    if !combo.is_empty() {
        combo.push('+');
    }
    combo.push_str(&binding.key);
    combo
}
