//! Command declaration and argument binding
//!
//! A command is declared through a [`CommandBuilder`]: every declaration call
//! appends a descriptor and hands back a slot handle, and [`CommandBuilder::reply`]
//! freezes the builder into an immutable [`Command`]. On each invocation the
//! tokens are bound into a fresh [`Frame`], which the reply handler reads
//! through the slot handles it captured.

use std::fmt;

use super::{AuthorizedRoles, Response, Sender};
use crate::application::errors::{CommandError, DeclarationError};

pub const NOT_AUTHORIZED: &str = "You are not authorized to run this command.";

/// A declared argument slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    Required { name: String },
    Optional { name: String },
    Default { name: String, value: String },
    Vararg { name: String },
}

impl Descriptor {
    pub fn name(&self) -> &str {
        match self {
            Descriptor::Required { name }
            | Descriptor::Optional { name }
            | Descriptor::Default { name, .. }
            | Descriptor::Vararg { name } => name,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Required { name } => write!(f, "{}", name),
            Descriptor::Optional { name } => write!(f, "[{}]", name),
            Descriptor::Default { name, value } => write!(f, "[{}={}]", name, value),
            Descriptor::Vararg { name } => write!(f, "[{}...]", name),
        }
    }
}

/// Handle to a required argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredArg(usize);

/// Handle to an optional argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalArg(usize);

/// Handle to an argument with a default value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultArg(usize);

/// Handle to the trailing variable arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Varargs(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    One(String),
    Absent,
    Many(Vec<String>),
}

/// Values bound for a single invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    values: Vec<Bound>,
}

impl Frame {
    fn bind(descriptors: &[Descriptor], args: &[String]) -> Self {
        let values = descriptors
            .iter()
            .enumerate()
            .map(|(i, descriptor)| match descriptor {
                Descriptor::Required { .. } | Descriptor::Optional { .. } => {
                    args.get(i).cloned().map_or(Bound::Absent, Bound::One)
                }
                Descriptor::Default { value, .. } => {
                    Bound::One(args.get(i).unwrap_or(value).clone())
                }
                Descriptor::Vararg { .. } => {
                    Bound::Many(args.get(i..).map(<[String]>::to_vec).unwrap_or_default())
                }
            })
            .collect();
        Self { values }
    }

    pub fn get<S: Slot>(&self, slot: S) -> S::Value<'_> {
        slot.resolve(self)
    }
}

/// A slot handle that knows how to read its value out of a [`Frame`]
pub trait Slot {
    type Value<'a>;

    fn resolve<'a>(&self, frame: &'a Frame) -> Self::Value<'a>;
}

impl Slot for RequiredArg {
    type Value<'a> = &'a str;

    fn resolve<'a>(&self, frame: &'a Frame) -> &'a str {
        match frame.values.get(self.0) {
            Some(Bound::One(v)) => v,
            _ => "",
        }
    }
}

impl Slot for OptionalArg {
    type Value<'a> = Option<&'a str>;

    fn resolve<'a>(&self, frame: &'a Frame) -> Option<&'a str> {
        match frame.values.get(self.0) {
            Some(Bound::One(v)) => Some(v),
            _ => None,
        }
    }
}

impl Slot for DefaultArg {
    type Value<'a> = &'a str;

    fn resolve<'a>(&self, frame: &'a Frame) -> &'a str {
        match frame.values.get(self.0) {
            Some(Bound::One(v)) => v,
            _ => "",
        }
    }
}

impl Slot for Varargs {
    type Value<'a> = &'a [String];

    fn resolve<'a>(&self, frame: &'a Frame) -> &'a [String] {
        match frame.values.get(self.0) {
            Some(Bound::Many(v)) => v,
            _ => &[],
        }
    }
}

/// Passed to a reply handler for the duration of one invocation
pub struct ReplyScope<'a> {
    pub sender: &'a Sender,
    pub args: Frame,
    /// Reactions to attach to the triggering message.
    pub reactions: Vec<String>,
}

impl<'a> ReplyScope<'a> {
    pub fn get<S: Slot>(&self, slot: S) -> S::Value<'_> {
        self.args.get(slot)
    }

    /// Runs another command as the current sender.
    pub fn run(&self, command: &Command, args: &[&str]) -> Result<Response, CommandError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        command.run(self.sender, &args)
    }

    /// Formats a link so chat clients don't embed a preview.
    pub fn link(&self, link: &str) -> String {
        format!("<{}>", link)
    }
}

/// Reply handler signature
pub type ReplyHandler = dyn Fn(&mut ReplyScope<'_>) -> Result<String, CommandError> + Send + Sync;

/// A frozen, callable command
///
/// The name is not part of the command; it is the key the command is
/// registered under.
pub struct Command {
    descriptors: Vec<Descriptor>,
    required: usize,
    optional: usize,
    vararg: bool,
    roles: AuthorizedRoles,
    private_reply: bool,
    not_authorized: String,
    summary: Option<String>,
    handler: Box<ReplyHandler>,
}

impl Command {
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn private_reply(&self) -> bool {
        self.private_reply
    }

    pub fn roles(&self) -> &AuthorizedRoles {
        &self.roles
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_authorized(&self, sender: &Sender) -> bool {
        self.roles.permits(sender)
    }

    /// Argument-count check. Returns the rejection to send if it fails.
    ///
    /// The rejection is always public, whatever the command's own flag.
    pub fn check_bounds(&self, count: usize) -> Result<(), Response> {
        if count < self.required {
            return Err(Response::new(
                format!("expected at least {} argument(s), got {}", self.required, count),
                false,
            ));
        }
        let max = self.required + self.optional;
        if !self.vararg && count > max {
            return Err(Response::new(
                format!("expected at most {} argument(s), got {}", max, count),
                false,
            ));
        }
        Ok(())
    }

    /// Bounds, then authorization.
    pub fn check(&self, sender: &Sender, count: usize) -> Result<(), Response> {
        self.check_bounds(count)?;
        if !self.is_authorized(sender) {
            return Err(self.response(self.not_authorized.clone()));
        }
        Ok(())
    }

    /// Binds `args` and calls the handler without any checks.
    pub fn invoke(&self, sender: &Sender, args: &[String]) -> Result<Response, CommandError> {
        let mut scope = ReplyScope {
            sender,
            args: Frame::bind(&self.descriptors, args),
            reactions: Vec::new(),
        };
        let reply = (self.handler)(&mut scope)?;
        Ok(self.response(reply).with_reactions(scope.reactions))
    }

    /// Checks and invokes.
    pub fn run(&self, sender: &Sender, args: &[String]) -> Result<Response, CommandError> {
        match self.check(sender, args.len()) {
            Ok(()) => self.invoke(sender, args),
            Err(rejection) => Ok(rejection),
        }
    }

    /// The parameter list, e.g. `oldBase newBase [num=0] [rest...]`.
    pub fn usage(&self) -> String {
        self.descriptors
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn help(&self, command_char: char, name: &str) -> String {
        let usage = format!("Usage: {}{} {}", command_char, name, self.usage());
        let usage = usage.trim_end();
        match &self.summary {
            Some(summary) => format!("{} {}", summary, usage),
            None => usage.to_string(),
        }
    }

    fn response(&self, reply: impl Into<String>) -> Response {
        Response::new(reply, self.private_reply)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("descriptors", &self.descriptors)
            .field("roles", &self.roles)
            .field("private_reply", &self.private_reply)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

/// Accumulates argument descriptors until [`CommandBuilder::reply`] is called
#[derive(Debug)]
pub struct CommandBuilder {
    descriptors: Vec<Descriptor>,
    required: usize,
    optional: usize,
    vararg: bool,
    roles: AuthorizedRoles,
    not_authorized: Option<String>,
    summary: Option<String>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
            required: 0,
            optional: 0,
            vararg: false,
            roles: AuthorizedRoles::unrestricted(),
            not_authorized: None,
            summary: None,
        }
    }

    /// Free-text summary shown in front of the usage line.
    pub fn help(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn roles(mut self, roles: AuthorizedRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn not_authorized(mut self, message: impl Into<String>) -> Self {
        self.not_authorized = Some(message.into());
        self
    }

    pub fn required(&mut self, name: impl Into<String>) -> Result<RequiredArg, DeclarationError> {
        self.reject_after_vararg("required")?;
        match self.descriptors.last() {
            Some(Descriptor::Optional { .. }) => return Err(DeclarationError::RequiredAfterOptional),
            Some(Descriptor::Default { .. }) => return Err(DeclarationError::RequiredAfterDefault),
            _ => {}
        }
        self.required += 1;
        Ok(RequiredArg(self.push(Descriptor::Required { name: name.into() })))
    }

    pub fn optional(&mut self, name: impl Into<String>) -> Result<OptionalArg, DeclarationError> {
        self.reject_after_vararg("optional")?;
        self.optional += 1;
        Ok(OptionalArg(self.push(Descriptor::Optional { name: name.into() })))
    }

    pub fn default(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<DefaultArg, DeclarationError> {
        self.reject_after_vararg("default")?;
        self.optional += 1;
        Ok(DefaultArg(self.push(Descriptor::Default {
            name: name.into(),
            value: value.into(),
        })))
    }

    pub fn vararg(&mut self, name: impl Into<String>) -> Result<Varargs, DeclarationError> {
        self.reject_after_vararg("vararg")?;
        self.vararg = true;
        Ok(Varargs(self.push(Descriptor::Vararg { name: name.into() })))
    }

    /// Freezes the declaration into a command.
    pub fn reply<F>(self, private_reply: bool, handler: F) -> Command
    where
        F: Fn(&mut ReplyScope<'_>) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        Command {
            descriptors: self.descriptors,
            required: self.required,
            optional: self.optional,
            vararg: self.vararg,
            roles: self.roles,
            private_reply,
            not_authorized: self.not_authorized.unwrap_or_else(|| NOT_AUTHORIZED.to_string()),
            summary: self.summary,
            handler: Box::new(handler),
        }
    }

    fn reject_after_vararg(&self, kind: &'static str) -> Result<(), DeclarationError> {
        if self.vararg {
            return Err(DeclarationError::AfterVararg { kind });
        }
        Ok(())
    }

    fn push(&mut self, descriptor: Descriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }
}

/// A command that always replies with the same text.
pub fn static_command(message: impl Into<String>) -> Command {
    let message = message.into();
    CommandBuilder::new().reply(false, move |_| Ok(message.clone()))
}
