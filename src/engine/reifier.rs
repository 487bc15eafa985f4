//! Classic-mode value reification
//!
//! Walks the capture list pushing host values, dispatching on capture
//! kind. Where the encoded mode reconstructs a tree for an output buffer,
//! this mode evaluates captures: positions become integers, groups become
//! tables, function captures call into the host, and so on.

use tracing::trace;

use crate::common::errors::ReifyError;
use crate::common::types::{CapKind, Capture};
use crate::engine::backref::find_back;
use crate::engine::ktable::Ktable;
use crate::engine::state::CapState;
use crate::engine::value::{create_match, CapTable, Value};

/// Reification driver over one capture list.
pub struct Reifier<'a> {
    pub(crate) cs: CapState<'a>,
    pub(crate) extra_args: &'a [Value],
    pub(crate) runtime_values: &'a [Value],
    pub(crate) max_str_caps: usize,
}

/// Reify a capture list into host values.
///
/// `match_end` is the byte offset one past the matched range; when the
/// list produces no values the 1-based end position is pushed as the sole
/// result, so the caller always receives at least one value.
pub fn reify_captures(
    subject: &[u8],
    caps: &[Capture],
    ktable: &Ktable,
    match_end: usize,
    extra_args: &[Value],
    runtime_values: &[Value],
    max_str_caps: usize,
) -> Result<Vec<Value>, ReifyError> {
    let mut out = Vec::new();
    if caps.first().map(|c| !c.is_terminator()).unwrap_or(false) {
        let mut reifier = Reifier {
            cs: CapState::new(caps, subject, ktable),
            extra_args,
            runtime_values,
            max_str_caps,
        };
        loop {
            reifier.push_capture(&mut out)?;
            match reifier.cs.current() {
                Ok(c) if !c.is_terminator() => continue,
                _ => break,
            }
        }
    }
    if out.is_empty() {
        out.push(Value::Int(match_end as i64 + 1));
    }
    Ok(out)
}

impl<'a> Reifier<'a> {
    pub(crate) fn new(
        cs: CapState<'a>,
        extra_args: &'a [Value],
        runtime_values: &'a [Value],
        max_str_caps: usize,
    ) -> Self {
        Self {
            cs,
            extra_args,
            runtime_values,
            max_str_caps,
        }
    }

    fn subject_slice(&self, start: usize, end: usize) -> Vec<u8> {
        let subject = self.cs.subject();
        let start = start.min(subject.len());
        let end = end.min(subject.len()).max(start);
        subject[start..end].to_vec()
    }

    /// Push all values of the capture at the cursor; returns how many
    /// values were pushed.
    pub(crate) fn push_capture(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let cap = *self.cs.current()?;
        trace!(kind = ?cap.kind, pos = cap.pos(), "reify capture");
        match cap.kind {
            CapKind::Position => {
                out.push(Value::Int(cap.pos() as i64));
                self.cs.advance();
                Ok(1)
            }
            CapKind::Arg => {
                self.cs.advance();
                let value = cap
                    .idx
                    .checked_sub(1)
                    .and_then(|i| self.extra_args.get(i as usize))
                    .ok_or(ReifyError::AbsentArgument(cap.idx))?;
                out.push(value.clone());
                Ok(1)
            }
            CapKind::Simple => {
                let k = self.push_nested_values(out, true)?;
                // The whole-match string was pushed last; make it the
                // first of this capture's values.
                let n = out.len();
                out[n - k..].rotate_right(1);
                Ok(k)
            }
            CapKind::Runtime => {
                self.cs.advance();
                let value = self
                    .runtime_values
                    .get(cap.idx as usize)
                    .ok_or(ReifyError::AbsentRuntime(cap.idx))?;
                out.push(value.clone());
                Ok(1)
            }
            CapKind::String => {
                let mut buf = Vec::new();
                self.string_cap(&mut buf)?;
                out.push(Value::Str(buf));
                Ok(1)
            }
            CapKind::Group => {
                if cap.idx == 0 {
                    self.push_nested_values(out, false)
                } else {
                    // Named groups produce no values of their own.
                    self.cs.skip_capture()?;
                    Ok(0)
                }
            }
            CapKind::Backref => self.backref_cap(out),
            CapKind::Table => self.table_cap(out),
            CapKind::Function => self.function_cap(out),
            CapKind::Num => self.num_cap(out),
            CapKind::Query => self.query_cap(out),
            CapKind::Fold => self.fold_cap(out),
            CapKind::Rosie => self.rosie_cap(out),
            CapKind::RosieSimple => self.rosie_simple_cap(out),
            CapKind::Close | CapKind::Final => Err(ReifyError::Unbalanced),
        }
    }

    /// Push the values generated by captures nested inside the capture at
    /// the cursor. `addextra` also pushes the whole-match string after
    /// them; the whole match is pushed regardless when nothing else was
    /// produced, so the count is never zero.
    pub(crate) fn push_nested_values(
        &mut self,
        out: &mut Vec<Value>,
        addextra: bool,
    ) -> Result<usize, ReifyError> {
        let open = *self.cs.current()?;
        self.cs.advance();
        if open.is_full() {
            out.push(Value::Str(
                self.subject_slice(open.start, open.start + open.match_len()),
            ));
            return Ok(1);
        }
        let mut n = 0;
        while !self.cs.current()?.is_close() {
            n += self.push_capture(out)?;
        }
        if addextra || n == 0 {
            let close_start = self.cs.cap().start;
            out.push(Value::Str(self.subject_slice(open.start, close_start)));
            n += 1;
        }
        self.cs.advance();
        Ok(n)
    }

    /// Push only the first value generated by nested captures.
    pub(crate) fn push_one_nested_value(
        &mut self,
        out: &mut Vec<Value>,
    ) -> Result<(), ReifyError> {
        let n = self.push_nested_values(out, false)?;
        out.truncate(out.len() - (n - 1));
        Ok(())
    }

    fn backref_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let current = self.cs.pos;
        let name = self.cs.name_at_cursor()?.to_string();
        let target = find_back(&self.cs, current, &name)?;
        self.cs.pos = target;
        let n = self.push_nested_values(out, false)?;
        self.cs.pos = current + 1;
        Ok(n)
    }

    fn table_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let cap = *self.cs.current()?;
        self.cs.advance();
        let mut table = CapTable::new();
        if cap.is_full() {
            out.push(Value::Table(table));
            return Ok(1);
        }
        while !self.cs.current()?.is_close() {
            let child = *self.cs.cap();
            if child.kind == CapKind::Group && child.idx != 0 {
                let name = self.cs.name_at_cursor()?.to_string();
                let mut tmp = Vec::new();
                self.push_one_nested_value(&mut tmp)?;
                table.insert(name, tmp.pop().expect("one nested value"));
            } else {
                let mut tmp = Vec::new();
                self.push_capture(&mut tmp)?;
                table.list.extend(tmp);
            }
        }
        self.cs.advance();
        out.push(Value::Table(table));
        Ok(1)
    }

    fn function_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let idx = self.cs.cap().idx;
        let f = self.cs.ktable().function(idx)?.clone();
        let mut args = Vec::new();
        self.push_nested_values(&mut args, false)?;
        let results = f(&args)?;
        let n = results.len();
        out.extend(results);
        Ok(n)
    }

    fn num_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let idx = self.cs.cap().idx;
        if idx == 0 {
            // Select nothing: skip the entire capture.
            self.cs.skip_capture()?;
            return Ok(0);
        }
        let mut tmp = Vec::new();
        let n = self.push_nested_values(&mut tmp, false)?;
        if n < idx as usize {
            return Err(ReifyError::NoCapture(idx));
        }
        out.push(tmp.swap_remove(idx as usize - 1));
        Ok(1)
    }

    fn query_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let idx = self.cs.cap().idx;
        let mut tmp = Vec::new();
        self.push_one_nested_value(&mut tmp)?;
        let key = tmp.pop().expect("one nested value");
        let map = self.cs.ktable().map(idx)?;
        match key.as_map_key().and_then(|k| map.get(&k)) {
            Some(value) => {
                out.push(value.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn fold_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let cap = *self.cs.current()?;
        self.cs.advance();
        if cap.is_full() || self.cs.current()?.is_close() {
            return Err(ReifyError::NoFoldInitial);
        }
        let mut tmp = Vec::new();
        let n = self.push_capture(&mut tmp)?;
        if n == 0 {
            return Err(ReifyError::NoFoldInitial);
        }
        tmp.truncate(1);
        let mut acc = tmp.pop().expect("initial value");
        let f = self.cs.ktable().function(cap.idx)?.clone();
        while !self.cs.current()?.is_close() {
            let mut args = vec![acc];
            self.push_capture(&mut args)?;
            let mut results = f(&args)?;
            if results.is_empty() {
                return Err(ReifyError::FoldNoResult);
            }
            acc = results.swap_remove(0);
        }
        self.cs.advance();
        out.push(acc);
        Ok(1)
    }

    /// Rosie captures reify to match tables of the shape
    /// `{name: {pos, text, subs}}`.
    fn rosie_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let cap = *self.cs.current()?;
        let name = self.cs.name_at_cursor()?.to_string();
        self.cs.advance();
        if cap.is_full() {
            let text = self.subject_slice(cap.start, cap.start + cap.match_len());
            out.push(create_match(name, cap.pos(), text, Vec::new()));
            return Ok(1);
        }
        let mut subs = Vec::new();
        while !self.cs.current()?.is_close() {
            self.push_capture(&mut subs)?;
        }
        let close_start = self.cs.cap().start;
        let text = self.subject_slice(cap.start, close_start);
        self.cs.advance();
        out.push(create_match(name, cap.pos(), text, subs));
        Ok(1)
    }

    /// Rosie position-pair captures push nested values followed by the
    /// span of the whole match as a two-element list.
    fn rosie_simple_cap(&mut self, out: &mut Vec<Value>) -> Result<usize, ReifyError> {
        let cap = *self.cs.current()?;
        self.cs.advance();
        let span = |s: usize, e: usize| {
            Value::Table(CapTable {
                list: vec![Value::Int(s as i64 + 1), Value::Int(e as i64 + 1)],
                named: Default::default(),
            })
        };
        if cap.is_full() {
            out.push(span(cap.start, cap.start + cap.match_len()));
            return Ok(1);
        }
        let mut n = 0;
        while !self.cs.current()?.is_close() {
            n += self.push_capture(out)?;
        }
        let close_start = self.cs.cap().start;
        self.cs.advance();
        out.push(span(cap.start, close_start));
        Ok(n + 1)
    }
}
