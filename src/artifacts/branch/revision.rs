use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;

/// Ancestry suffixes recognized on a revision argument
const PARENT_SUFFIX: &str = r"^(.+)\^$";
const ANCESTOR_SUFFIX: &str = r"^(.+)\~(\d+)$";

/// Shorthand names that stand for another ref
const REF_ALIASES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "@" => "HEAD",
};

/// A parsed revision argument
///
/// Accepts ref names (`main`, `HEAD`), the `@` alias, full and abbreviated
/// object ids, and the `^` / `~<n>` ancestry suffixes in any combination.
/// A hex-looking string parses as [`Revision::Ref`] and only falls back to
/// object id lookup during resolution, so a branch named `cafe` shadows the
/// equally-named object prefix.
#[derive(Debug, Clone)]
pub enum Revision {
    Ref(BranchName),
    Ancestor(Box<Revision>, usize),
    Parent(Box<Revision>),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent_regex = regex::Regex::new(PARENT_SUFFIX)?;
        if let Some(captures) = parent_regex.captures(revision) {
            let base = Self::try_parse(&captures[1])?;
            return Ok(Revision::Parent(Box::new(base)));
        }

        let ancestor_regex = regex::Regex::new(ANCESTOR_SUFFIX)?;
        if let Some(captures) = ancestor_regex.captures(revision) {
            let base = Self::try_parse(&captures[1])?;
            let generations: usize = captures[2]
                .parse()
                .with_context(|| format!("bad generation count in revision '{revision}'"))?;
            return Ok(Revision::Ancestor(Box::new(base), generations));
        }

        let name = *REF_ALIASES.get(revision).unwrap_or(&revision);
        Ok(Revision::Ref(BranchName::try_parse(name.to_string())?))
    }

    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        match self {
            Revision::Ref(branch_name) => {
                let name = branch_name.as_ref();

                match repository.refs().read_ref(branch_name.clone()) {
                    Ok(oid) => Ok(oid),
                    Err(_) if Self::looks_like_oid(name) => {
                        Self::resolve_oid(name, repository).map(Some)
                    }
                    Err(_) => Err(anyhow::anyhow!("branch {} not found", name)),
                }
            }
            Revision::Parent(base) => {
                Self::parent_of(base.resolve(repository)?, repository)
            }
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::parent_of(oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn parent_of(
        oid: Option<ObjectId>,
        repository: &Repository,
    ) -> anyhow::Result<Option<ObjectId>> {
        let Some(oid) = oid else {
            return Ok(None);
        };
        let Some(commit) = repository.database().parse_object_as_commit(&oid)? else {
            anyhow::bail!("object {} is not a commit", oid);
        };

        Ok(commit.parent().cloned())
    }

    fn resolve_oid(candidate: &str, repository: &Repository) -> anyhow::Result<ObjectId> {
        if candidate.len() == OBJECT_ID_LENGTH {
            let oid = ObjectId::try_parse(candidate.to_string())?;
            Self::ensure_treeish(&oid, repository)?;
            return Ok(oid);
        }

        let matches = repository.database().find_objects_by_prefix(candidate)?;
        match matches.len() {
            0 => anyhow::bail!(
                "ambiguous argument '{}': unknown revision or path not in the working tree",
                candidate
            ),
            1 => {
                Self::ensure_treeish(&matches[0], repository)?;
                Ok(matches[0].clone())
            }
            _ => {
                // only commits and trees can name a comparison side
                let candidates: Vec<_> = matches
                    .iter()
                    .filter_map(|oid| {
                        match repository.database().get_object_type(oid) {
                            Ok(kind @ (ObjectType::Commit | ObjectType::Tree)) => {
                                Some((oid, kind))
                            }
                            _ => None,
                        }
                    })
                    .collect();

                match candidates.as_slice() {
                    [] => anyhow::bail!(
                        "ambiguous argument '{}': unknown revision or path not in the working tree",
                        candidate
                    ),
                    [(only, _)] => Ok((*only).clone()),
                    _ => {
                        let mut message =
                            format!("short SHA1 {candidate} is ambiguous\nhint: The candidates are:");
                        for (oid, kind) in &candidates {
                            message.push_str(&format!("\nhint:   {} {}", oid.to_short_oid(), kind));
                        }
                        anyhow::bail!(message)
                    }
                }
            }
        }
    }

    fn ensure_treeish(oid: &ObjectId, repository: &Repository) -> anyhow::Result<()> {
        let object_type = repository
            .database()
            .get_object_type(oid)
            .with_context(|| format!("object {} not found", oid))?;

        match object_type {
            ObjectType::Commit | ObjectType::Tree => Ok(()),
            other => anyhow::bail!(
                "object {} is a {}, not a commit or tree",
                oid.to_short_oid(),
                other
            ),
        }
    }

    fn looks_like_oid(candidate: &str) -> bool {
        (4..=OBJECT_ID_LENGTH).contains(&candidate.len())
            && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }
}
