//! Relation inference from naming conventions.
//!
//! Relations are never read from the catalog directly. They are inferred from
//! names:
//!
//! * a table named `a_has_b` is a join table backing a many-to-many relation
//!   between `a` and `b`;
//! * a column `x_one` makes the current table the extension side of a
//!   one-to-one relation with `x`;
//! * a column `x_id` makes the current table the many side of a one-to-many
//!   relation with `x` (inside a join table it identifies one member of the
//!   many-to-many relation instead).
//!
//! Candidates are deduplicated, confirmed against the scanned tables and then
//! turned into association columns on both ends. Candidates pointing at a
//! table that does not exist are dropped without error.

use crate::ir::{self, Column, ColumnType, OrmTag, Table, FK_SUFFIX, JOIN_INFIX, ONE_SUFFIX};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany { through: String },
}

impl RelationKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RelationKind::OneToOne => "one2one",
            RelationKind::OneToMany => "one2many",
            RelationKind::ManyToMany { .. } => "m2m",
        }
    }
}

/// A relation implied by a naming convention, from `source` (where the
/// convention was observed) to `target` (the table it names).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRelation {
    pub kind: RelationKind,
    pub source: String,
    pub target: String,
    pub rel_one: bool,
    pub reverse_one: bool,
    pub rel_o2m: bool,
    pub reverse_many: bool,
    pub rel_m2m: bool,
    /// Set once `target` is known to exist.
    pub correct: bool,
}

impl TableRelation {
    fn new(kind: RelationKind, source: &str, target: &str) -> Self {
        TableRelation {
            kind,
            source: source.to_string(),
            target: target.to_string(),
            rel_one: false,
            reverse_one: false,
            rel_o2m: false,
            reverse_many: false,
            rel_m2m: false,
            correct: false,
        }
    }

    /// `source` is the extension table, `target` the base table.
    pub fn one_to_one(source: &str, target: &str) -> Self {
        TableRelation {
            rel_one: true,
            reverse_one: true,
            ..Self::new(RelationKind::OneToOne, source, target)
        }
    }

    /// `source` is the many side, `target` the one side.
    pub fn one_to_many(source: &str, target: &str) -> Self {
        TableRelation {
            rel_o2m: true,
            reverse_many: true,
            ..Self::new(RelationKind::OneToMany, source, target)
        }
    }

    /// Link column of a join table: no reverse collection on `target`.
    pub fn join_member(join: &str, target: &str) -> Self {
        TableRelation {
            rel_o2m: true,
            ..Self::new(RelationKind::OneToMany, join, target)
        }
    }

    /// Many-to-many relation backed by `join`, split at its last `_has_`.
    pub fn many_to_many(join: &str) -> Option<Self> {
        let pos = join.rfind(JOIN_INFIX)?;
        let left = &join[..pos];
        let right = &join[pos + JOIN_INFIX.len()..];
        Some(TableRelation {
            rel_m2m: true,
            reverse_many: true,
            ..Self::new(
                RelationKind::ManyToMany {
                    through: join.to_string(),
                },
                left,
                right,
            )
        })
    }

    pub fn through(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::ManyToMany { through } => Some(through),
            _ => None,
        }
    }

    pub fn from_join_table(&self) -> bool {
        self.source.contains(JOIN_INFIX)
    }

    fn key(&self) -> (String, String) {
        (self.source.clone(), self.target.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Column on the source table pointing at the target.
    Forward,
    /// Column on the target table pointing back at the source.
    Reverse,
}

fn association_column(tr: &TableRelation, direction: Direction) -> Option<Column> {
    let mut tag = OrmTag {
        null: true,
        ..Default::default()
    };
    let (name, ty) = match direction {
        Direction::Forward => {
            let name = ir::pascal_case(&tr.target);
            if tr.rel_one {
                tag.rel_one = true;
                tag.comment = format!(
                    "one-to-one with [{0}], this is the extension table, linked by {0}_id",
                    tr.target
                );
                (name.clone(), ColumnType::Ref(name))
            } else if tr.rel_o2m {
                tag.rel_fk = true;
                tag.comment = if tr.from_join_table() {
                    format!("{}_id is the join table link column", tr.target)
                } else {
                    format!(
                        "many-to-one with [{0}], this is the child table, linked by {0}_id",
                        tr.target
                    )
                };
                (name.clone(), ColumnType::Ref(name))
            } else if tr.reverse_many {
                let through = tr.through().unwrap_or_default();
                tag.reverse_many = true;
                tag.m2m = true;
                tag.m2m_through = through.to_string();
                tag.comment = format!("many-to-many with [{}] through {}", tr.target, through);
                (format!("{}s", name), ColumnType::RefList(name))
            } else {
                return None;
            }
        }
        Direction::Reverse => {
            let name = ir::pascal_case(&tr.source);
            if tr.reverse_one {
                tag.reverse_one = true;
                tag.comment = format!(
                    "one-to-one with [{}], this is the base table, linked by id",
                    tr.source
                );
                (name.clone(), ColumnType::Ref(name))
            } else if tr.rel_m2m {
                let through = tr.through().unwrap_or_default();
                tag.rel_m2m = true;
                tag.m2m = true;
                tag.m2m_through = through.to_string();
                tag.comment = format!("many-to-many with [{}] through {}", tr.source, through);
                (format!("{}s", name), ColumnType::RefList(name))
            } else if tr.reverse_many {
                tag.reverse_many = true;
                tag.comment = format!(
                    "one-to-many with [{}], this is the parent table, linked by id",
                    tr.source
                );
                (format!("{}s", name), ColumnType::RefList(name))
            } else {
                return None;
            }
        }
    };
    Some(Column {
        name,
        ty,
        is_need: true,
        tag,
    })
}

fn inject(table: &mut Table, tr: &TableRelation, direction: Direction) {
    if let Some(col) = association_column(tr, direction) {
        debug!(table = %table.name, field = %col.name, ty = %col.ty, "add association field");
        table.relation.push(col.name.clone());
        table.columns.push(col);
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationSummary {
    pub discovered: usize,
    pub unique: usize,
    pub confirmed: Vec<TableRelation>,
}

/// Owns the relation state of one inference run: every candidate in
/// discovery order, the candidates deduplicated by `(source, target)`, and
/// the confirmed relations.
#[derive(Debug, Default)]
pub struct InferenceEngine {
    discovered: Vec<TableRelation>,
    unique: IndexMap<(String, String), TableRelation>,
    correct: Vec<TableRelation>,
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discovered(&self) -> &[TableRelation] {
        &self.discovered
    }

    pub fn unique(&self) -> impl Iterator<Item = &TableRelation> {
        self.unique.values()
    }

    pub fn confirmed(&self) -> &[TableRelation] {
        &self.correct
    }

    /// Run all phases in order and mutate `tables` in place.
    pub fn run(&mut self, tables: &mut [Table]) -> RelationSummary {
        self.discover(tables);
        self.deduplicate();
        self.confirm_reverse(tables);
        self.confirm_forward(tables);
        RelationSummary {
            discovered: self.discovered.len(),
            unique: self.unique.len(),
            confirmed: self.correct.clone(),
        }
    }

    /// Scan table and column names for relation conventions. Marker columns
    /// that never appear in the struct (`x_one`, join table `x_id`) are
    /// switched off here.
    pub fn discover(&mut self, tables: &mut [Table]) {
        for table in tables.iter_mut() {
            let join = table.is_join();
            if join {
                if let Some(tr) = TableRelation::many_to_many(&table.name) {
                    debug!(join = %table.name, left = %tr.source, right = %tr.target, "join table");
                    self.discovered.push(tr);
                }
            }
            for col in table.columns.iter_mut() {
                let src = col.tag.column.as_str();
                if src.is_empty() || src == table.pk {
                    continue;
                }
                if !join {
                    if let Some(target) = src.strip_suffix(ONE_SUFFIX) {
                        col.is_need = false;
                        if !target.is_empty() {
                            self.discovered
                                .push(TableRelation::one_to_one(&table.name, target));
                        }
                    } else if let Some(target) = src.strip_suffix(FK_SUFFIX) {
                        if !target.is_empty() {
                            self.discovered
                                .push(TableRelation::one_to_many(&table.name, target));
                        }
                    }
                } else if let Some(target) = src.strip_suffix(FK_SUFFIX) {
                    col.is_need = false;
                    if !target.is_empty() {
                        self.discovered
                            .push(TableRelation::join_member(&table.name, target));
                    }
                }
            }
        }
        debug!(count = self.discovered.len(), "discovered relation candidates");
    }

    /// Merge candidates by `(source, target)`. One-to-many wins a collision;
    /// otherwise the first candidate is kept.
    pub fn deduplicate(&mut self) {
        self.unique.clear();
        for tr in &self.discovered {
            match self.unique.entry(tr.key()) {
                Entry::Vacant(e) => {
                    e.insert(tr.clone());
                }
                Entry::Occupied(mut e) => {
                    if tr.kind == RelationKind::OneToMany && e.get().kind != RelationKind::OneToMany {
                        debug!(
                            source = %tr.source,
                            target = %tr.target,
                            replaced = e.get().kind.tag(),
                            "one2many wins duplicate relation"
                        );
                        e.insert(tr.clone());
                    }
                }
            }
        }
    }

    /// Confirm every relation whose target exists and can be referenced, and
    /// give the target a field pointing back at the source. Join table link
    /// relations are confirmed without a back reference.
    pub fn confirm_reverse(&mut self, tables: &mut [Table]) {
        self.correct.clear();
        for table in tables.iter_mut() {
            if table.is_degenerate() {
                continue;
            }
            for tr in self.unique.values() {
                if table.name != tr.target {
                    continue;
                }
                if !tr.from_join_table() {
                    inject(table, tr, Direction::Reverse);
                }
                let mut confirmed = tr.clone();
                confirmed.correct = true;
                self.correct.push(confirmed);
            }
        }

        let known: HashSet<(&str, &str)> = self
            .correct
            .iter()
            .map(|tr| (tr.source.as_str(), tr.target.as_str()))
            .collect();
        for tr in self.unique.values() {
            if !known.contains(&(tr.source.as_str(), tr.target.as_str())) {
                debug!(source = %tr.source, target = %tr.target, kind = tr.kind.tag(), "dropped dangling relation");
            }
        }
    }

    /// Give each source table a field pointing at the target and hide the
    /// physical `<target>_id` column it replaces.
    pub fn confirm_forward(&mut self, tables: &mut [Table]) {
        for table in tables.iter_mut() {
            for tr in &self.correct {
                if table.name != tr.source || !tr.correct {
                    continue;
                }
                inject(table, tr, Direction::Forward);
                let link = format!("{}{}", tr.target, FK_SUFFIX);
                let pk = table.pk.clone();
                for col in table.columns.iter_mut() {
                    if col.tag.column == link && col.tag.column != pk {
                        col.is_need = false;
                    }
                }
            }
        }
    }
}

/// Build the association graph for `tables` with a fresh engine.
pub fn infer_relations(tables: &mut [Table]) -> RelationSummary {
    InferenceEngine::new().run(tables)
}
