//! Chainable operations on terms.
//!
//! These mirror the method surface of the query language:
//! `r.table("users").filter(...).order_by(...).limit(10)` becomes
//!
//! ```rust,ignore
//! let query = r::table(["users"])?
//!     .filter(r::row().bracket("age")?.gt(30)?)?
//!     .order_by([r::desc(["age"])?])?
//!     .limit(10)?;
//! ```
//!
//! The receiver always becomes the first positional argument. Arguments in
//! function positions (predicates, mappings, keys) go through
//! [`Arg::into_func_term`], so expressions reading `r::row()` are turned into
//! one-parameter lambdas.

use super::arg::{wrap_all, Arg};
use super::ast::Term;
use super::options::{
    BetweenOptions, DeleteOptions, DuringOptions, EqJoinOptions, FilterOptions, GetAllOptions,
    GroupOptions, InsertOptions, OrderByOptions, TableCreateOptions, TableOptions, WriteOptions,
};
use super::terms::TermType;
use crate::error::Result;
use crate::r;

macro_rules! nullary_methods {
    ($($(#[$meta:meta])* $name:ident => $term_type:ident),+ $(,)?) => {
        impl Term {
            $(
                $(#[$meta])*
                pub fn $name(self) -> Term {
                    Term::new(TermType::$term_type).with_arg(self)
                }
            )+
        }
    };
}

macro_rules! value_methods {
    ($($(#[$meta:meta])* $name:ident => $term_type:ident),+ $(,)?) => {
        impl Term {
            $(
                $(#[$meta])*
                pub fn $name<A: Into<Arg>>(self, value: A) -> Result<Term> {
                    self.chain(TermType::$term_type, vec![value.into().into_term()?])
                }
            )+
        }
    };
}

macro_rules! func_methods {
    ($($(#[$meta:meta])* $name:ident => $term_type:ident),+ $(,)?) => {
        impl Term {
            $(
                $(#[$meta])*
                pub fn $name<A: Into<Arg>>(self, func: A) -> Result<Term> {
                    self.chain(TermType::$term_type, vec![func.into().into_func_term()?])
                }
            )+
        }
    };
}

macro_rules! variadic_methods {
    ($($(#[$meta:meta])* $name:ident => $term_type:ident),+ $(,)?) => {
        impl Term {
            $(
                $(#[$meta])*
                pub fn $name<I, A>(self, values: I) -> Result<Term>
                where
                    I: IntoIterator<Item = A>,
                    A: Into<Arg>,
                {
                    self.chain(TermType::$term_type, wrap_all(values)?)
                }
            )+
        }
    };
}

nullary_methods! {
    count => Count,
    distinct => Distinct,
    keys => Keys,
    values => Values,
    zip => Zip,
    ungroup => Ungroup,
    delete => Delete,
    type_of => TypeOf,
    info => Info,
    not => Not,
    table_list => TableList,
    timezone => Timezone,
    date => Date,
    time_of_day => TimeOfDay,
    year => Year,
    month => Month,
    day => Day,
    day_of_week => DayOfWeek,
    day_of_year => DayOfYear,
    hours => Hours,
    minutes => Minutes,
    seconds => Seconds,
    to_iso8601 => ToIso8601,
    to_epoch_time => ToEpochTime,
}

value_methods! {
    /// `row[field]`: field access on objects, index access on arrays.
    bracket => Bracket,
    get_field => GetField,
    limit => Limit,
    skip => Skip,
    nth => Nth,
    append => Append,
    prepend => Prepend,
    union => Union,
    get => Get,
    insert => Insert,
    coerce_to => CoerceTo,
    in_timezone => InTimezone,
    eq => Eq,
    ne => Ne,
    lt => Lt,
    le => Le,
    gt => Gt,
    ge => Ge,
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    mod_ => Mod,
    and => And,
    or => Or,
    table_drop => TableDrop,
}

func_methods! {
    filter => Filter,
    map => Map,
    concat_map => ConcatMap,
    reduce => Reduce,
    for_each => ForEach,
    /// Value to use when the receiver errors or is null. A function receives
    /// the error message.
    default => Default,
    contains => Contains,
    merge => Merge,
    /// Changes may be an object or a function of the document.
    update => Update,
    replace => Replace,
}

variadic_methods! {
    pluck => Pluck,
    without => Without,
    has_fields => HasFields,
    get_all => GetAll,
}

impl Term {
    fn chain(self, term_type: TermType, rest: Vec<Term>) -> Result<Term> {
        Ok(Term::new(term_type).with_arg(self).with_args(rest))
    }

    pub fn filter_with<A: Into<Arg>>(self, predicate: A, options: FilterOptions) -> Result<Term> {
        self.filter(predicate)?.with_options(options)
    }

    /// Sort by keys. `r::asc` / `r::desc` terms pass through; other keys sit
    /// in a function position.
    pub fn order_by<I, A>(self, keys: I) -> Result<Term>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let keys = keys
            .into_iter()
            .map(|key| key.into().into_func_term())
            .collect::<Result<Vec<_>>>()?;
        self.chain(TermType::OrderBy, keys)
    }

    pub fn order_by_with<I, A>(self, keys: I, options: OrderByOptions) -> Result<Term>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.order_by(keys)?.with_options(options)
    }

    pub fn slice<A: Into<Arg>, B: Into<Arg>>(self, start: A, end: B) -> Result<Term> {
        self.chain(TermType::Slice, vec![start.into().into_term()?, end.into().into_term()?])
    }

    pub fn get_all_with<I, A>(self, keys: I, options: GetAllOptions) -> Result<Term>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.get_all(keys)?.with_options(options)
    }

    pub fn between<A: Into<Arg>, B: Into<Arg>>(self, lower: A, upper: B) -> Result<Term> {
        self.between_with(lower, upper, BetweenOptions::default())
    }

    pub fn between_with<A: Into<Arg>, B: Into<Arg>>(
        self,
        lower: A,
        upper: B,
        options: BetweenOptions,
    ) -> Result<Term> {
        self.chain(TermType::Between, vec![lower.into().into_term()?, upper.into().into_term()?])?
            .with_options(options)
    }

    pub fn insert_with<A: Into<Arg>>(self, documents: A, options: InsertOptions) -> Result<Term> {
        self.insert(documents)?.with_options(options)
    }

    pub fn update_with<A: Into<Arg>>(self, changes: A, options: WriteOptions) -> Result<Term> {
        self.update(changes)?.with_options(options)
    }

    pub fn replace_with<A: Into<Arg>>(self, document: A, options: WriteOptions) -> Result<Term> {
        self.replace(document)?.with_options(options)
    }

    pub fn delete_with(self, options: DeleteOptions) -> Result<Term> {
        self.delete().with_options(options)
    }

    /// Join on `field` of the receiver against the primary key (or `index`)
    /// of `table`.
    pub fn eq_join<A: Into<Arg>>(self, field: A, table: Term) -> Result<Term> {
        self.eq_join_with(field, table, EqJoinOptions::default())
    }

    pub fn eq_join_with<A: Into<Arg>>(
        self,
        field: A,
        table: Term,
        options: EqJoinOptions,
    ) -> Result<Term> {
        self.chain(TermType::EqJoin, vec![field.into().into_func_term()?, table])?
            .with_options(options)
    }

    pub fn inner_join<A: Into<Arg>>(self, other: Term, predicate: A) -> Result<Term> {
        self.chain(TermType::InnerJoin, vec![other, predicate.into().into_func_term()?])
    }

    pub fn outer_join<A: Into<Arg>>(self, other: Term, predicate: A) -> Result<Term> {
        self.chain(TermType::OuterJoin, vec![other, predicate.into().into_func_term()?])
    }

    pub fn group<I, A>(self, fields: I) -> Result<Term>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.group_with(fields, GroupOptions::default())
    }

    pub fn group_with<I, A>(self, fields: I, options: GroupOptions) -> Result<Term>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let fields = fields
            .into_iter()
            .map(|field| field.into().into_func_term())
            .collect::<Result<Vec<_>>>()?;
        self.chain(TermType::Group, fields)?.with_options(options)
    }

    pub fn sum(self) -> Term {
        Term::new(TermType::Sum).with_arg(self)
    }

    pub fn avg(self) -> Term {
        Term::new(TermType::Avg).with_arg(self)
    }

    pub fn min(self) -> Term {
        Term::new(TermType::Min).with_arg(self)
    }

    pub fn max(self) -> Term {
        Term::new(TermType::Max).with_arg(self)
    }

    /// Sum over a field name or a function of each element.
    pub fn sum_by<A: Into<Arg>>(self, field: A) -> Result<Term> {
        self.chain(TermType::Sum, vec![field.into().into_func_term()?])
    }

    pub fn avg_by<A: Into<Arg>>(self, field: A) -> Result<Term> {
        self.chain(TermType::Avg, vec![field.into().into_func_term()?])
    }

    pub fn min_by<A: Into<Arg>>(self, field: A) -> Result<Term> {
        self.chain(TermType::Min, vec![field.into().into_func_term()?])
    }

    pub fn max_by<A: Into<Arg>>(self, field: A) -> Result<Term> {
        self.chain(TermType::Max, vec![field.into().into_func_term()?])
    }

    pub fn during<A: Into<Arg>, B: Into<Arg>>(self, start: A, end: B) -> Result<Term> {
        self.during_with(start, end, DuringOptions::default())
    }

    pub fn during_with<A: Into<Arg>, B: Into<Arg>>(
        self,
        start: A,
        end: B,
        options: DuringOptions,
    ) -> Result<Term> {
        self.chain(TermType::During, vec![start.into().into_term()?, end.into().into_term()?])?
            .with_options(options)
    }

    /// Call `func` with the receiver as its argument.
    pub fn do_<A: Into<Arg>>(self, func: A) -> Result<Term> {
        let func = func.into().into_func_term()?;
        r::check_call_arity(&func, 1)?;
        Ok(Term::new(TermType::Funcall).with_arg(func).with_arg(self))
    }

    // Database-scoped administration

    pub fn table<A: Into<Arg>>(self, name: A) -> Result<Term> {
        self.table_with(name, TableOptions::default())
    }

    pub fn table_with<A: Into<Arg>>(self, name: A, options: TableOptions) -> Result<Term> {
        self.chain(TermType::Table, vec![name.into().into_term()?])?
            .with_options(options)
    }

    pub fn table_create<A: Into<Arg>>(self, name: A) -> Result<Term> {
        self.table_create_with(name, TableCreateOptions::default())
    }

    pub fn table_create_with<A: Into<Arg>>(
        self,
        name: A,
        options: TableCreateOptions,
    ) -> Result<Term> {
        self.chain(TermType::TableCreate, vec![name.into().into_term()?])?
            .with_options(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reql::options::{Conflict, Durability};
    use crate::reql::Datum;

    #[test]
    fn test_receiver_is_first_argument() {
        let table = r::table(["users"]).unwrap();
        let query = table.clone().limit(5).unwrap();

        assert_eq!(query.term_type(), TermType::Limit);
        assert_eq!(query.first_arg(), Some(&table));
        assert_eq!(query.arg(1).unwrap().as_datum(), Some(&Datum::Integer(5)));
    }

    #[test]
    fn test_filter_wraps_implicit_row() {
        let query = r::table(["users"])
            .unwrap()
            .filter(r::row().bracket("age").unwrap().gt(30).unwrap())
            .unwrap();

        let predicate = query.arg(1).unwrap();
        assert!(predicate.is_func());
        assert_eq!(predicate.func_params().unwrap().len(), 1);
        assert_eq!(predicate.func_body().unwrap().term_type(), TermType::Gt);
    }

    #[test]
    fn test_filter_with_object_stays_literal() {
        let mut pattern = std::collections::BTreeMap::new();
        pattern.insert("active".to_string(), true);
        let query = r::table(["users"]).unwrap().filter(pattern).unwrap();

        assert_eq!(query.arg(1).unwrap().term_type(), TermType::MakeObj);
    }

    #[test]
    fn test_insert_with_options() {
        let query = r::table(["users"])
            .unwrap()
            .insert_with(
                vec![Datum::from("a")],
                InsertOptions {
                    conflict: Some(Conflict::Replace),
                    durability: Some(Durability::Soft),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(query.term_type(), TermType::Insert);
        assert_eq!(query.optargs().len(), 2);
        assert_eq!(query.optarg("conflict").unwrap().as_datum(), Some(&Datum::from("replace")));
        assert!(query.optarg("return_changes").is_none());
    }

    #[test]
    fn test_eq_join_and_zip() {
        let query = r::table(["posts"])
            .unwrap()
            .eq_join("author_id", r::table(["users"]).unwrap())
            .unwrap()
            .zip();

        assert_eq!(query.term_type(), TermType::Zip);
        let join = query.first_arg().unwrap();
        assert_eq!(join.term_type(), TermType::EqJoin);
        assert_eq!(join.args().len(), 3);
        assert!(join.optargs().is_empty());
    }

    #[test]
    fn test_group_by_function() {
        let query = r::table(["orders"])
            .unwrap()
            .group([r::func(|order| order.bracket("customer"))])
            .unwrap()
            .sum_by("total")
            .unwrap();

        assert_eq!(query.term_type(), TermType::Sum);
        let group = query.first_arg().unwrap();
        assert!(group.arg(1).unwrap().is_func());
    }

    #[test]
    fn test_do_puts_function_first() {
        let query = r::expr(5).unwrap().do_(r::func(|x| x.mul(2))).unwrap();
        assert_eq!(query.term_type(), TermType::Funcall);
        assert!(query.first_arg().unwrap().is_func());
        assert_eq!(query.arg(1).unwrap().as_datum(), Some(&Datum::Integer(5)));
    }

    #[test]
    fn test_do_rejects_mismatched_function() {
        let five = r::expr(5).unwrap();
        assert!(five.clone().do_(r::func2(|a, b| a.add(b))).is_err());
        assert!(five.do_(r::row().mul(2).unwrap()).is_ok());
    }

    #[test]
    fn test_db_scoped_table_create() {
        let query = r::db(["app"])
            .unwrap()
            .table_create_with(
                "events",
                TableCreateOptions { primary_key: Some("uuid".into()), ..Default::default() },
            )
            .unwrap();

        assert_eq!(query.term_type(), TermType::TableCreate);
        assert_eq!(query.first_arg().unwrap().term_type(), TermType::Db);
        assert_eq!(query.optargs().len(), 1);
    }

    #[test]
    fn test_time_accessors_chain() {
        let query = r::now().in_timezone("-07:00").unwrap().day_of_week();
        assert_eq!(query.term_type(), TermType::DayOfWeek);
        assert_eq!(query.first_arg().unwrap().term_type(), TermType::InTimezone);
    }
}
