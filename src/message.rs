// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of unix-logger.
//
// unix-logger is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// unix-logger is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
// even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with unix-logger.  If
// not, see <http://www.gnu.org/licenses/>.

//! Message payloads & the strategies that turn them into text.
//!
//! # Introduction
//!
//! A log call carries its message as a [`Payload`]: a small, [`Copy`]able enumeration that only
//! *borrows* what the caller handed in. Nothing is formatted, & nothing allocated, until an engine
//! has decided the call is enabled & asks for the text via [`Payload::render`]. That's what makes it
//! cheap to leave DEBUG calls in hot paths.
//!
//! Expensive inputs should be handed over lazily, as a closure ([`Payload::Lazy`]) or via
//! [`format_args!`] ([`Payload::Args`]); the facade can't un-evaluate arguments its caller already
//! computed.
//!
//! # Message Factories
//!
//! The one payload shape whose rendering isn't fixed is [`Payload::Format`]: a run-time template
//! plus positional arguments. How the two are combined is the job of a [`MessageFactory`], which is
//! bound to each logger when it is first created. [`ParameterizedMessageFactory`] (the default)
//! substitutes `{}` placeholders; [`SimpleMessageFactory`] emits the template as-is.

use std::fmt::{Display, Write};

/// A message that knows how to render itself, built ahead of the log call.
pub trait StructuredMessage {
    /// The fully-formatted text of this message
    fn formatted_message(&self) -> String;
    /// An error carried by the message itself, if any. Engines use it when the log call doesn't
    /// attach one explicitly.
    fn error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          enum Payload                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The message part of a single log call.
#[derive(Clone, Copy)]
pub enum Payload<'a> {
    /// Plain text, logged verbatim
    Text(&'a str),
    /// A template with `{}`-style placeholders & the arguments to substitute. The facade doesn't
    /// check that the counts agree; the logger's [`MessageFactory`] decides what a mismatch
    /// looks like.
    Format {
        template: &'a str,
        args: &'a [&'a dyn Display],
    },
    /// Compile-time checked formatting, as produced by [`format_args!`]
    Args(std::fmt::Arguments<'a>),
    /// A pre-built message
    Structured(&'a dyn StructuredMessage),
    /// Any value, logged via its [`Display`] implementation
    Value(&'a dyn Display),
    /// Text produced on demand; the closure is only invoked if the call is enabled
    Lazy(&'a dyn Fn() -> String),
}

impl<'a> Payload<'a> {
    pub fn format(template: &'a str, args: &'a [&'a dyn Display]) -> Payload<'a> {
        Payload::Format { template, args }
    }
    pub fn structured(msg: &'a dyn StructuredMessage) -> Payload<'a> {
        Payload::Structured(msg)
    }
    pub fn value(value: &'a dyn Display) -> Payload<'a> {
        Payload::Value(value)
    }
    pub fn lazy(producer: &'a dyn Fn() -> String) -> Payload<'a> {
        Payload::Lazy(producer)
    }

    /// A short name for the shape of this payload (handy for engines & for tests)
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Format { .. } => "format",
            Payload::Args(_) => "args",
            Payload::Structured(_) => "structured",
            Payload::Value(_) => "value",
            Payload::Lazy(_) => "lazy",
        }
    }

    /// Produce the final message text, using `factory` for [`Payload::Format`].
    pub fn render(&self, factory: &dyn MessageFactory) -> String {
        match self {
            Payload::Text(text) => text.to_string(),
            Payload::Format { template, args } => factory.format(template, args),
            Payload::Args(args) => std::fmt::format(*args),
            Payload::Structured(msg) => msg.formatted_message(),
            Payload::Value(value) => value.to_string(),
            Payload::Lazy(producer) => producer(),
        }
    }

    /// The error carried by a [`Payload::Structured`] message, if any
    pub fn error(&self) -> Option<&'a (dyn std::error::Error + 'static)> {
        match *self {
            Payload::Structured(msg) => msg.error(),
            _ => None,
        }
    }
}

impl<'a> std::fmt::Debug for Payload<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Payload::Format { template, args } => f
                .debug_struct("Format")
                .field("template", template)
                .field("args", &args.len())
                .finish(),
            Payload::Args(args) => f.debug_tuple("Args").field(args).finish(),
            // Don't render anything here; Debug output must stay free of side-effects.
            other => write!(f, "{}(..)", other.kind()),
        }
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Payload::Text(text)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Payload::Text(text.as_str())
    }
}

impl<'a> From<std::fmt::Arguments<'a>> for Payload<'a> {
    fn from(args: std::fmt::Arguments<'a>) -> Self {
        Payload::Args(args)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                        message factories                                       //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The message-construction strategy bound to a logger.
pub trait MessageFactory: Send + Sync {
    /// Identifies the strategy; two factories with the same name are considered interchangeable
    fn name(&self) -> &'static str;
    /// Combine `template` & `args` into the final message text
    fn format(&self, template: &str, args: &[&dyn Display]) -> String;
}

impl std::fmt::Debug for dyn MessageFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageFactory({})", self.name())
    }
}

/// Substitutes `{}` placeholders, left to right.
///
/// - `\{}` produces a literal `{}` & consumes no argument
/// - placeholders beyond the last argument are left in the output as `{}`
/// - arguments beyond the last placeholder are dropped
#[derive(Clone, Copy, Debug, Default)]
pub struct ParameterizedMessageFactory;

impl MessageFactory for ParameterizedMessageFactory {
    fn name(&self) -> &'static str {
        "parameterized"
    }
    fn format(&self, template: &str, args: &[&dyn Display]) -> String {
        format_parameterized(template, args)
    }
}

/// Never substitutes; the template is the message.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleMessageFactory;

impl MessageFactory for SimpleMessageFactory {
    fn name(&self) -> &'static str {
        "simple"
    }
    fn format(&self, template: &str, _args: &[&dyn Display]) -> String {
        template.to_string()
    }
}

/// The substitution performed by [`ParameterizedMessageFactory`].
pub fn format_parameterized(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + 8 * args.len());
    let mut args = args.iter();
    let bytes = template.as_bytes();
    let (mut start, mut i) = (0, 0);
    while i < bytes.len() {
        // Both arms match on ASCII bytes, so `i + 1` is always a char boundary.
        match bytes[i] {
            b'\\' if template[i + 1..].starts_with("{}") => {
                out.push_str(&template[start..i]);
                out.push_str("{}");
                i += 3;
                start = i;
            }
            b'{' if template[i + 1..].starts_with('}') => {
                out.push_str(&template[start..i]);
                match args.next() {
                    Some(arg) => {
                        let _ = write!(out, "{}", arg);
                    }
                    None => out.push_str("{}"),
                }
                i += 2;
                start = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&template[start..]);
    out
}

/// An owned template & pre-rendered arguments, for messages assembled ahead of the log call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterizedMessage {
    template: String,
    args: Vec<String>,
}

impl ParameterizedMessage {
    pub fn new<S: Into<String>>(template: S, args: &[&dyn Display]) -> ParameterizedMessage {
        ParameterizedMessage {
            template: template.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
    pub fn template(&self) -> &str {
        &self.template
    }
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl StructuredMessage for ParameterizedMessage {
    fn formatted_message(&self) -> String {
        let args: Vec<&dyn Display> = self.args.iter().map(|a| a as &dyn Display).collect();
        format_parameterized(&self.template, &args)
    }
}
