use ethers::contract::abigen;

abigen!(
    BallotRegistry,
    r#"[
        function currentRoot() external view returns (uint256)
        function leafCount() external view returns (uint256)
        function inclusionPath(uint256 leafIndex) external view returns (uint256[] memory, uint256[] memory)
        function commitmentIndex(uint256 commitmentHash) external view returns (bool, uint256)
        function proposals(uint256 proposalId) external view returns (string memory, uint256, uint256, uint256, uint256, bool, bytes memory)
        function registerMultipleUsers(string[] memory usernames, address[] memory userAddresses, uint256[] memory commitmentHashes) external
        function vote(bytes memory proof, uint256[4] memory publicInputs) external
        event UsersRegistered(uint256[] indices)
        event ProposalVoted(uint256 indexed proposalId, uint256 voteType)
    ]"#
);
