// -*- coding: utf-8 -*-
// ------------------------------------------------------------------------------------------------
// Copyright © 2026, cspin authors.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License.  You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the
// License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either
// express or implied.  See the License for the specific language governing permissions and
// limitations under the License.
// ------------------------------------------------------------------------------------------------

//! Parser for cspin source files.
//!
//! A source file is a sequence of lines: alphabet declarations, channel declarations, process
//! definitions, one environment trace (prefixed `=`), and one bare expression naming the root
//! process to run.  `--` starts a comment.

use cspin_core::channel_in;
use cspin_core::channel_out;
use cspin_core::event;
use cspin_core::external_choice;
use cspin_core::general_choice;
use cspin_core::internal_choice;
use cspin_core::parallel;
use cspin_core::prefix;
use cspin_core::process_ref;
use cspin_core::stop;
use cspin_core::Alphabet;
use cspin_core::AlphabetTable;
use cspin_core::ChannelTable;
use cspin_core::ProcessKind;
use cspin_core::ProcessNode;
use cspin_core::ProcessTable;
use cspin_core::Program;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "cspin.pest"]
struct CspinParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(Box<pest::error::Error<Rule>>),

    #[error("process {0} is defined more than once")]
    DuplicateDefinition(String),

    #[error("more than one environment trace")]
    DuplicateEnvironment,

    #[error("more than one root expression")]
    DuplicateRoot,

    #[error("no root expression to run")]
    MissingRoot,
}

/// Parses a whole source file into a [`Program`], ready for the static pass.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut pairs = CspinParser::parse(Rule::program, source)
        .map_err(|error| ParseError::Syntax(Box::new(error)))?;
    let program = pairs.next().expect("the grammar yields one program");

    let mut processes = ProcessTable::new();
    let mut alphabets = AlphabetTable::new();
    let mut channels = ChannelTable::new();
    let mut environment: Option<Vec<String>> = None;
    let mut root: Option<ProcessNode> = None;

    for statement in program.into_inner() {
        match statement.as_rule() {
            Rule::alphabet_decl => {
                let (name, events) = build_named_list(statement);
                alphabets.entry(name).or_default().union_with(&events);
            }
            Rule::channel_decl => {
                let (name, events) = build_named_list(statement);
                channels.entry(name).or_default().union_with(&events);
            }
            Rule::environment => {
                if environment.is_some() {
                    return Err(ParseError::DuplicateEnvironment);
                }
                environment = Some(build_event_list(statement));
            }
            Rule::definition => {
                let mut inner = statement.into_inner();
                let name = inner
                    .next()
                    .expect("a definition has a name")
                    .as_str()
                    .to_owned();
                let tree = build_expr(inner.next().expect("a definition has an expression"));
                if processes.insert(name.clone(), tree).is_some() {
                    return Err(ParseError::DuplicateDefinition(name));
                }
            }
            Rule::root_expr => {
                if root.is_some() {
                    return Err(ParseError::DuplicateRoot);
                }
                let inner = statement
                    .into_inner()
                    .next()
                    .expect("a root line has an expression");
                root = Some(build_expr(inner));
            }
            Rule::EOI => {}
            rule => unreachable!("statement rule {rule:?}"),
        }
    }

    Ok(Program {
        processes,
        alphabets,
        channels,
        environment: environment.unwrap_or_default(),
        root: root.ok_or(ParseError::MissingRoot)?,
    })
}

fn build_named_list(pair: Pair<Rule>) -> (String, Alphabet) {
    let mut name = String::new();
    let mut events = Alphabet::new();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::ident => name = part.as_str().to_owned(),
            Rule::event_list => events = part.into_inner().map(|event| event.as_str()).collect(),
            _ => {}
        }
    }
    (name, events)
}

fn build_event_list(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .find(|part| part.as_rule() == Rule::event_list)
        .map(|list| {
            list.into_inner()
                .map(|event| event.as_str().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum ChoiceOp {
    External,
    General,
    Internal,
}

fn build_expr(pair: Pair<Rule>) -> ProcessNode {
    let mut operands: Vec<ProcessNode> = pair.into_inner().map(build_choice).collect();
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        parallel(operands)
    }
}

fn build_choice(pair: Pair<Rule>) -> ProcessNode {
    let mut inner = pair.into_inner();
    let mut node = build_prefix(inner.next().expect("a choice has a first operand"));

    // Consecutive identical operators collapse into one n-ary node; a change of operator nests
    // the collapsed node as the first branch of the next one.
    let mut grown: Option<ChoiceOp> = None;
    while let Some(op_pair) = inner.next() {
        let op = match op_pair.as_str().trim() {
            "[]" => ChoiceOp::External,
            "|~|" => ChoiceOp::Internal,
            _ => ChoiceOp::General,
        };
        let rhs = build_prefix(inner.next().expect("an operator has a right operand"));
        if grown == Some(op) {
            if let ProcessKind::ExternalChoice(branches)
            | ProcessKind::GeneralChoice(branches)
            | ProcessKind::InternalChoice(branches) = &mut node.kind
            {
                branches.push(rhs);
            }
        } else {
            node = match op {
                ChoiceOp::External => external_choice(vec![node, rhs]),
                ChoiceOp::General => general_choice(vec![node, rhs]),
                ChoiceOp::Internal => internal_choice(vec![node, rhs]),
            };
            grown = Some(op);
        }
    }
    node
}

fn build_prefix(pair: Pair<Rule>) -> ProcessNode {
    let inner = pair.into_inner().next().expect("a prefix expression has a form");
    match inner.as_rule() {
        Rule::channel_out => {
            let mut parts = inner.into_inner();
            let channel = parts.next().expect("an output has a channel").as_str();
            let value = parts.next().expect("an output has a value").as_str();
            let after = build_prefix(parts.next().expect("an output has a continuation"));
            channel_out(channel, value, after)
        }
        Rule::channel_in => {
            let mut parts = inner.into_inner();
            let channel = parts.next().expect("an input has a channel").as_str();
            let variable = parts.next().expect("an input has a variable").as_str();
            let after = build_prefix(parts.next().expect("an input has a continuation"));
            channel_in(channel, variable, after)
        }
        Rule::event_prefix => {
            let mut parts = inner.into_inner();
            let name = parts.next().expect("a prefix has an event").as_str().to_owned();
            let after = build_prefix(parts.next().expect("a prefix has a continuation"));
            if let ProcessKind::Stop = after.kind {
                event(name)
            } else {
                prefix(name, after)
            }
        }
        Rule::atom => build_atom(inner),
        rule => unreachable!("prefix expression form {rule:?}"),
    }
}

fn build_atom(pair: Pair<Rule>) -> ProcessNode {
    let inner = pair.into_inner().next().expect("an atom has a form");
    match inner.as_rule() {
        Rule::stop_kw => stop(),
        Rule::paren => build_expr(
            inner
                .into_inner()
                .next()
                .expect("parentheses contain an expression"),
        ),
        Rule::proc_ref => process_ref(inner.as_str()),
        rule => unreachable!("atom form {rule:?}"),
    }
}
