use fnv::FnvHashMap;

/// The integer type a constant is declared with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConstantWidth {
    /// Members of an `<enums type="bitmask">` block.
    Bitfield,
    Enum,
    /// `type="u"`
    UInt,
    /// `type="ull"`
    UInt64,
}

impl ConstantWidth {
    /// The name of the GL type alias for this width.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstantWidth::Bitfield => "GLbitfield",
            ConstantWidth::Enum => "GLenum",
            ConstantWidth::UInt => "GLuint",
            ConstantWidth::UInt64 => "GLuint64",
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            ConstantWidth::UInt64 => 64,
            _ => 32,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumMember {
    /// The generated member name, e.g. `OneMinusSrcAlpha`.
    pub name: String,

    /// The name of the generated constant the member refers to, e.g. `ONE_MINUS_SRC_ALPHA`.
    pub constant: String,

    pub width: ConstantWidth,
}

/// A generated enumeration for one semantic group of constants.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EnumGroup {
    name: String,
    width: ConstantWidth,
    bitmask: bool,
    members: Vec<EnumMember>,
}

impl EnumGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying integer width, taken from the first member of the group.
    pub fn width(&self) -> ConstantWidth {
        self.width
    }

    pub fn is_bitmask(&self) -> bool {
        self.bitmask
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }
}

/// The semantic groups of a registry in the order in which they were first discovered.
#[derive(Clone, Default, Debug)]
pub struct EnumGroups {
    groups: Vec<EnumGroup>,
    index: FnvHashMap<String, usize>,
}

impl EnumGroups {
    pub fn new() -> Self {
        EnumGroups::default()
    }

    /// Adds `member` to the group called `group`, creating the group if this is its first member.
    ///
    /// A new group takes its width and bitmask flag from its first member. Returns `false` and
    /// leaves the group unchanged if it already has a member with the same generated name.
    pub fn add_member(&mut self, group: &str, bitmask: bool, member: EnumMember) -> bool {
        let groups = &mut self.groups;
        let position = *self.index.entry(group.to_string()).or_insert_with(|| {
            groups.push(EnumGroup {
                name: group.to_string(),
                width: member.width,
                bitmask,
                members: Vec::new(),
            });

            groups.len() - 1
        });

        let group = &mut self.groups[position];

        if group.members.iter().any(|m| m.name == member.name) {
            return false;
        }

        group.members.push(member);

        true
    }

    pub fn get(&self, name: &str) -> Option<&EnumGroup> {
        self.index.get(name).map(|&position| &self.groups[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
