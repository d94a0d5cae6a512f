pub struct CommandHelp {
    pub usage: &'static str,
    pub description: &'static str,
}

pub struct CommandCategory {
    pub name: &'static str,
    pub commands: &'static [CommandHelp],
}

pub const COMMAND_CATEGORIES: &[CommandCategory] = &[
    CommandCategory {
        name: "Search",
        commands: &[
            CommandHelp {
                usage: "type <text>",
                description: "Update the query and fetch suggestions",
            },
            CommandHelp {
                usage: "search <text>",
                description: "Search videos",
            },
            CommandHelp {
                usage: "select <n>",
                description: "Pick a suggestion or video row",
            },
            CommandHelp {
                usage: "more",
                description: "Load the next page of results",
            },
            CommandHelp {
                usage: "show",
                description: "Show the current result list",
            },
        ],
    },
    CommandCategory {
        name: "Playlists",
        commands: &[
            CommandHelp {
                usage: "playlists",
                description: "List playlists",
            },
            CommandHelp {
                usage: "new <title>",
                description: "Create a playlist",
            },
            CommandHelp {
                usage: "rm <n>",
                description: "Delete playlist n",
            },
            CommandHelp {
                usage: "save <n>",
                description: "Add the selected video to playlist n",
            },
            CommandHelp {
                usage: "clear-all",
                description: "Delete every playlist and video",
            },
        ],
    },
    CommandCategory {
        name: "General",
        commands: &[
            CommandHelp {
                usage: "help",
                description: "Show this help",
            },
            CommandHelp {
                usage: "quit",
                description: "Exit",
            },
        ],
    },
];

pub fn render_help() -> Vec<String> {
    let mut lines = vec!["Commands".to_string()];
    for category in COMMAND_CATEGORIES {
        lines.push(String::new());
        lines.push(category.name.to_string());
        for command in category.commands {
            lines.push(format!("  {:16}{}", command.usage, command.description));
        }
    }
    lines
}
